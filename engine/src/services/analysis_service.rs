// Runs every level calculator over one bar series and assembles the snapshot
use crate::config::policy::MIN_SESSIONS;
use crate::config::{EngineSettings, PolicyParams};
use crate::indicators::calendar::next_trading_day;
use crate::indicators::{
    AverageTrueRange, FibonacciProjector, GaussianBandEstimator, HistoricalLevelExtractor, LevelCalculator,
    PivotCalculator, Sma, ZoneSynthesizer,
};
use shared::models::{BarSeries, MarketBar};
use shared::snapshot::{AnalysisSnapshot, PreviousDay};

/// Analysis entry point bound to one set of policy parameters.
///
/// Holds no state between calls; every `analyze` recomputes from the series it is given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisEngine {
    params: PolicyParams,
}

impl AnalysisEngine {
    pub fn new(params: PolicyParams) -> Self {
        AnalysisEngine { params }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(settings.policy_params())
    }

    pub fn params(&self) -> &PolicyParams {
        &self.params
    }

    pub fn analyze(&self, bars: &BarSeries) -> Option<AnalysisSnapshot> {
        analyze_session(bars, &self.params)
    }
}

fn run<C: LevelCalculator>(calculator: &C, bars: &BarSeries) -> C::Output {
    tracing::debug!(
        calculator = calculator.name(),
        parameters = %calculator.parameters(),
        "Running level calculator"
    );
    calculator.calculate(bars)
}

/// Builds the pre-session snapshot, or `None` when fewer than two sessions are available.
pub fn analyze_session(bars: &BarSeries, params: &PolicyParams) -> Option<AnalysisSnapshot> {
    if bars.len() < MIN_SESSIONS {
        tracing::warn!(
            sessions = bars.len(),
            required = MIN_SESSIONS,
            "Not enough history to build an analysis snapshot"
        );
        return None;
    }
    let latest = bars.latest()?;
    let prior = bars.previous()?;

    let historical_sr = run(&HistoricalLevelExtractor::new(params), bars)?;
    let pivot_points = run(&PivotCalculator::new(params), bars)?;
    let fibonacci = run(&FibonacciProjector::new(params), bars);
    let gauss_levels = run(&GaussianBandEstimator::new(params), bars)?;
    let long_term_ma = run(&Sma::new(params.long_term_ma_period), bars);
    let atr = run(&AverageTrueRange::new(params), bars);

    let zones = ZoneSynthesizer::new(params);
    tracing::debug!(calculator = zones.name(), parameters = %zones.parameters(), "Synthesizing zones");
    let (trap_zones, accumulation_zones) = zones.synthesize(latest, &gauss_levels, &historical_sr);

    let operation_date = next_trading_day(latest.date);
    tracing::info!(
        policy = %params.policy,
        sessions = bars.len(),
        last_session = %latest.date,
        operation_date = %operation_date,
        has_fibonacci = fibonacci.is_some(),
        has_atr = atr.is_some(),
        "Analysis snapshot built"
    );

    Some(AnalysisSnapshot {
        policy: params.policy,
        operation_date,
        previous_day: previous_day(latest, prior),
        historical_sr,
        pivot_points,
        fibonacci,
        gauss_levels,
        long_term_ma,
        atr,
        trap_zones,
        accumulation_zones,
    })
}

fn previous_day(latest: &MarketBar, prior: &MarketBar) -> PreviousDay {
    // a zero prior close has no meaningful percentage change
    let variation = if prior.close != 0.0 && prior.close.is_finite() {
        Some((latest.close - prior.close) / prior.close * 100.0).filter(|v| v.is_finite())
    } else {
        None
    };

    PreviousDay {
        date: latest.date,
        open: latest.open,
        high: latest.high,
        low: latest.low,
        close: latest.close,
        range: latest.range(),
        variation,
    }
}
