// Simple Moving Average (SMA) of the most recent closes, used as the long-term trend filter
use super::LevelCalculator;
use serde_json::Value;
use shared::models::BarSeries;

pub struct Sma {
    name: String,
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("SMA({})", period),
            period,
        }
    }
}

impl LevelCalculator for Sma {
    type Output = Option<f64>;

    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, bars: &BarSeries) -> Option<f64> {
        if self.period == 0 || bars.len() < self.period {
            return None;
        }
        let sum: f64 = bars.recent(self.period).iter().map(|bar| bar.close).sum();
        Some(sum / self.period as f64)
    }
}
