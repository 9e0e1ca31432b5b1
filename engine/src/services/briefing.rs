// Plain-text pre-session briefing in pt-BR number and date format
use shared::snapshot::{AnalysisSnapshot, PriceLevel, PriceZone};
use shared::utils::brazilian_format::{format_date, format_decimal, format_price};
use std::fmt;

const MISSING: &str = "N/A";

fn price_or_missing(value: Option<f64>) -> String {
    value.map(format_price).unwrap_or_else(|| MISSING.to_string())
}

fn zone(zone: &PriceZone) -> String {
    format!("{} - {}", format_price(zone.start), format_price(zone.end))
}

// Highest level first, the way a trader reads a price ladder
fn ladder(f: &mut fmt::Formatter<'_>, levels: &[PriceLevel]) -> fmt::Result {
    for level in levels.iter().rev() {
        writeln!(f, "  {:<10} {}", level.label, format_price(level.value))?;
    }
    Ok(())
}

/// Text view of a snapshot; `to_string()` gives the full report.
pub struct Briefing<'a>(pub &'a AnalysisSnapshot);

impl Briefing<'_> {
    fn operational_data(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let previous = &self.0.previous_day;
        writeln!(f, "DADOS OPERACIONAIS:")?;
        writeln!(f, "  Data da operação: {}", format_date(self.0.operation_date))?;
        writeln!(f, "  Pregão anterior:  {}", format_date(previous.date))?;
        writeln!(
            f,
            "  Abertura {} | Máxima {} | Mínima {} | Fechamento {}",
            format_price(previous.open),
            format_price(previous.high),
            format_price(previous.low),
            format_price(previous.close)
        )?;
        let variation = previous
            .variation
            .map(|v| format!("{}%", format_decimal(v, 2)))
            .unwrap_or_else(|| MISSING.to_string());
        writeln!(f, "  Variação: {} | Range: {}", variation, format_price(previous.range))
    }

    fn price_structure(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pivots = &self.0.pivot_points;
        writeln!(f, "ESTRUTURA DE PREÇOS (PIVÔS):")?;
        ladder(f, &pivots.resistances)?;
        writeln!(f, "  {:<10} {}", "P", format_price(pivots.p))?;
        ladder(f, &pivots.supports)?;
        writeln!(f)?;

        writeln!(f, "SUPORTES E RESISTÊNCIAS HISTÓRICOS:")?;
        ladder(f, &self.0.historical_sr.resistances)?;
        ladder(f, &self.0.historical_sr.supports)
    }

    fn fibonacci(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FIBONACCI:")?;
        let Some(fib) = &self.0.fibonacci else {
            return writeln!(f, "  {}", MISSING);
        };
        let trend = if fib.is_uptrend { "alta" } else { "baixa" };
        writeln!(
            f,
            "  Swing {} - {} (tendência de {})",
            format_price(fib.swing_low),
            format_price(fib.swing_high),
            trend
        )?;
        writeln!(f, "  Retrações:")?;
        ladder(f, &fib.retracements)?;
        writeln!(f, "  Extensões:")?;
        ladder(f, &fib.extensions)
    }

    fn statistics(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gauss = &self.0.gauss_levels;
        writeln!(f, "BANDA GAUSSIANA:")?;
        writeln!(
            f,
            "  Equilíbrio (μ) {} | Desvio padrão (σ) {}",
            format_price(gauss.equilibrium),
            format_price(gauss.std_dev)
        )?;
        ladder(f, &gauss.levels)?;
        writeln!(f, "  Média longa: {}", price_or_missing(self.0.long_term_ma))?;
        writeln!(f)?;

        writeln!(f, "VOLATILIDADE E STOPS:")?;
        match &self.0.atr {
            Some(atr) => {
                writeln!(f, "  ATR: {}", format_price(atr.value))?;
                writeln!(f, "  Stop compra: {}", format_price(atr.buy_stop))?;
                writeln!(f, "  Stop venda:  {}", format_price(atr.sell_stop))
            }
            None => writeln!(f, "  ATR: {}", MISSING),
        }
    }

    fn zones(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let traps = &self.0.trap_zones;
        let accumulation = &self.0.accumulation_zones;
        writeln!(f, "ZONAS:")?;
        writeln!(f, "  Armadilha de compra:    {}", zone(&traps.buy_trap))?;
        writeln!(f, "  Armadilha de venda:     {}", zone(&traps.sell_trap))?;
        writeln!(f, "  Defesa vendedora:       {}", zone(&traps.seller_defense))?;
        writeln!(f, "  Acumulação primária:    {}", zone(&accumulation.primary))?;
        let secondary = accumulation
            .secondary
            .as_ref()
            .map(zone)
            .unwrap_or_else(|| MISSING.to_string());
        writeln!(f, "  Acumulação secundária:  {}", secondary)
    }
}

impl fmt::Display for Briefing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BRIEFING PRÉ-SESSÃO ({})", self.0.policy)?;
        writeln!(f)?;
        self.operational_data(f)?;
        writeln!(f)?;
        self.price_structure(f)?;
        writeln!(f)?;
        self.fibonacci(f)?;
        writeln!(f)?;
        self.statistics(f)?;
        writeln!(f)?;
        self.zones(f)
    }
}

pub fn render(snapshot: &AnalysisSnapshot) -> String {
    Briefing(snapshot).to_string()
}
