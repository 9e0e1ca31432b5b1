// Engine main entry point
use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use engine::config::settings::{EngineSettings, InputLayout};
use engine::data::BarParser;
use engine::services::briefing;
use engine::services::{AnalysisEngine, PositionRequest, PositionSizer};
use engine::EngineError;
use shared::models::AnalysisPolicy;
use shared::utils::brazilian_format::format_price;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Pre-session reference levels from a daily OHLC history.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a history file and print the briefing for the next session.
    Analyze(AnalyzeArgs),
    /// Size a position for a fixed share of the capital at risk.
    Size(SizeArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Exported daily history.
    file: PathBuf,

    /// Calculator family; overrides the settings file.
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// JSON settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input layout; overrides the settings file.
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Print the snapshot as JSON instead of the text briefing.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct SizeArgs {
    #[arg(long)]
    capital: f64,

    /// Percent of the capital put at risk.
    #[arg(long, default_value_t = 1.0)]
    risk_percent: f64,

    /// Stop distance in points.
    #[arg(long)]
    stop_points: f64,

    /// Target as a multiple of the stop.
    #[arg(long, default_value_t = 2.5)]
    target_multiplier: f64,

    /// JSON settings file (for the cost per point).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Classic,
    Extended,
}

impl From<PolicyArg> for AnalysisPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Classic => AnalysisPolicy::Classic,
            PolicyArg::Extended => AnalysisPolicy::Extended,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    Table,
    Delimited,
}

impl From<LayoutArg> for InputLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Table => InputLayout::Table,
            LayoutArg::Delimited => InputLayout::Delimited,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // stdout carries the report, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args),
        Commands::Size(args) => handle_size(args),
    }
}

fn load_settings(config: Option<&Path>) -> anyhow::Result<EngineSettings> {
    match config {
        Some(path) => EngineSettings::from_json_file(path)
            .with_context(|| format!("Failed to load settings from '{}'", path.display())),
        None => Ok(EngineSettings::default()),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(policy) = args.policy {
        settings.policy = policy.into();
    }
    if let Some(layout) = args.layout {
        settings.input.layout = layout.into();
    }
    info!(file = %args.file.display(), policy = %settings.policy, "Starting analysis");

    let series = match BarParser::load_file(&args.file, &settings) {
        Ok(series) => series,
        Err(EngineError::InsufficientData { found }) => {
            bail!(
                "Not enough history in '{}': {} valid session(s), at least 2 are needed",
                args.file.display(),
                found
            )
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load '{}'", args.file.display()));
        }
    };

    let engine = AnalysisEngine::from_settings(&settings);
    let Some(snapshot) = engine.analyze(&series) else {
        bail!("Not enough history in '{}' to build a snapshot", args.file.display());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", briefing::render(&snapshot));
    }
    Ok(())
}

fn handle_size(args: SizeArgs) -> anyhow::Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    let sizer = PositionSizer::from_settings(&settings.risk);
    let plan = sizer.size(&PositionRequest {
        capital: args.capital,
        risk_percent: args.risk_percent,
        stop_points: args.stop_points,
        target_multiplier: args.target_multiplier,
    });

    println!("Contratos: {}", plan.contracts);
    println!("Risco:     {}", format_price(plan.risk_value));
    println!("Ganho:     {}", format_price(plan.gain_value));
    println!("Relação:   1:{}", plan.reward_ratio);
    if let Some(alert) = plan.alert {
        println!("Alerta:    {}", alert);
    }
    Ok(())
}
