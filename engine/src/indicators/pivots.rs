// Floor-trader pivot points from the latest session
use super::LevelCalculator;
use crate::config::PolicyParams;
use serde_json::Value;
use shared::models::{AnalysisPolicy, BarSeries};
use shared::snapshot::{sort_ascending, PivotLevels, PriceLevel};

pub struct PivotCalculator {
    name: String,
    policy: AnalysisPolicy,
}

impl PivotCalculator {
    pub fn new(params: &PolicyParams) -> Self {
        Self {
            name: format!("Pivots({})", params.policy),
            policy: params.policy,
        }
    }

    /// Pivot levels for a session's high, low and close.
    ///
    /// Classic stops at R3/S3 and measures them one range beyond R1/S1; Extended uses the
    /// standard R3/S3 and adds R4/S4.
    pub fn levels(&self, high: f64, low: f64, close: f64) -> PivotLevels {
        let p = (high + low + close) / 3.0;
        let range = high - low;
        let r1 = 2.0 * p - low;
        let s1 = 2.0 * p - high;
        let r2 = p + range;
        let s2 = p - range;

        let (mut resistances, mut supports) = match self.policy {
            AnalysisPolicy::Classic => (
                vec![
                    PriceLevel::new("R1", r1),
                    PriceLevel::new("R2", r2),
                    PriceLevel::new("R3", r1 + range),
                ],
                vec![
                    PriceLevel::new("S1", s1),
                    PriceLevel::new("S2", s2),
                    PriceLevel::new("S3", s1 - range),
                ],
            ),
            AnalysisPolicy::Extended => (
                vec![
                    PriceLevel::new("R1", r1),
                    PriceLevel::new("R2", r2),
                    PriceLevel::new("R3", high + 2.0 * (p - low)),
                    PriceLevel::new("R4", high + 3.0 * (p - low)),
                ],
                vec![
                    PriceLevel::new("S1", s1),
                    PriceLevel::new("S2", s2),
                    PriceLevel::new("S3", low - 2.0 * (high - p)),
                    PriceLevel::new("S4", low - 3.0 * (high - p)),
                ],
            ),
        };
        sort_ascending(&mut resistances);
        sort_ascending(&mut supports);

        PivotLevels { p, resistances, supports }
    }
}

impl LevelCalculator for PivotCalculator {
    type Output = Option<PivotLevels>;

    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "policy": self.policy })
    }

    fn calculate(&self, bars: &BarSeries) -> Option<PivotLevels> {
        let latest = bars.latest()?;
        Some(self.levels(latest.high, latest.low, latest.close))
    }
}
