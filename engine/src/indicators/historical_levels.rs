// Support and resistance from prior session extremes
use super::LevelCalculator;
use crate::config::PolicyParams;
use serde_json::Value;
use shared::models::{AnalysisPolicy, BarSeries, MarketBar};
use shared::snapshot::{HistoricalLevels, PriceLevel};

/// Extended policy: highs within 1% below the close still count as resistance.
const RESISTANCE_CLOSE_RATIO: f64 = 0.99;
/// Extended policy: lows within 1% above the close still count as support.
const SUPPORT_CLOSE_RATIO: f64 = 1.01;

/// Picks distinct highs/lows from a lookback window.
///
/// Resistances are ranked from the highest high down, supports from the lowest low up, and
/// each list is capped at the configured count. When fewer distinct values pass the
/// threshold the last selected one is repeated, so the output always has exactly
/// `level_count` entries.
pub struct HistoricalLevelExtractor {
    name: String,
    policy: AnalysisPolicy,
    lookback: usize,
    level_count: usize,
}

impl HistoricalLevelExtractor {
    pub fn new(params: &PolicyParams) -> Self {
        Self {
            name: format!("HistoricalSR({})", params.historical_lookback),
            policy: params.policy,
            lookback: params.historical_lookback,
            level_count: params.historical_level_count,
        }
    }

    fn is_resistance(&self, high: f64, latest: &MarketBar) -> bool {
        match self.policy {
            AnalysisPolicy::Classic => high >= latest.high,
            AnalysisPolicy::Extended => high >= latest.close * RESISTANCE_CLOSE_RATIO,
        }
    }

    fn is_support(&self, low: f64, latest: &MarketBar) -> bool {
        match self.policy {
            AnalysisPolicy::Classic => low <= latest.low,
            AnalysisPolicy::Extended => low <= latest.close * SUPPORT_CLOSE_RATIO,
        }
    }
}

impl LevelCalculator for HistoricalLevelExtractor {
    type Output = Option<HistoricalLevels>;

    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "policy": self.policy,
            "lookback": self.lookback,
            "level_count": self.level_count,
        })
    }

    fn calculate(&self, bars: &BarSeries) -> Option<HistoricalLevels> {
        let latest = bars.latest()?;
        let window = bars.recent(self.lookback);

        let mut highs = distinct_positive(window.iter().map(|bar| bar.high));
        highs.reverse();
        let resistances: Vec<f64> = highs
            .into_iter()
            .filter(|&high| self.is_resistance(high, latest))
            .take(self.level_count)
            .collect();

        let lows = distinct_positive(window.iter().map(|bar| bar.low));
        let supports: Vec<f64> = lows
            .into_iter()
            .filter(|&low| self.is_support(low, latest))
            .take(self.level_count)
            .collect();

        let distinct_resistances = resistances.len();
        let distinct_supports = supports.len();
        let resistances = pad_levels(resistances, self.level_count, latest.high);
        let supports = pad_levels(supports, self.level_count, latest.low);

        let count = supports.len();
        Some(HistoricalLevels {
            resistances: resistances
                .into_iter()
                .enumerate()
                .map(|(idx, value)| PriceLevel::new(format!("R{}", idx + 1), value))
                .collect(),
            supports: supports
                .into_iter()
                .enumerate()
                .map(|(idx, value)| PriceLevel::new(format!("S{}", count - idx), value))
                .collect(),
            distinct_resistances,
            distinct_supports,
        })
    }
}

// Positive values, ascending, each value once
fn distinct_positive(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.filter(|v| *v > 0.0).collect();
    out.sort_by(|a, b| a.total_cmp(b));
    out.dedup();
    out
}

// Fills up to `count` by repeating the last level, then sorts ascending
fn pad_levels(mut levels: Vec<f64>, count: usize, fallback: f64) -> Vec<f64> {
    let filler = levels.last().copied().unwrap_or(fallback);
    levels.resize(count, filler);
    levels.sort_by(|a, b| a.total_cmp(b));
    levels
}
