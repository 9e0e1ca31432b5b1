// Fibonacci retracement and extension levels over the recent swing
use super::LevelCalculator;
use crate::config::PolicyParams;
use serde_json::Value;
use shared::models::{AnalysisPolicy, BarSeries};
use shared::snapshot::{sort_ascending, FibonacciLevels, PriceLevel};

const RETRACEMENTS: [(&str, f64); 5] = [
    ("23.6%", 0.236),
    ("38.2%", 0.382),
    ("50%", 0.5),
    ("61.8%", 0.618),
    ("78.6%", 0.786),
];

const SWING_EXTENSIONS: [(&str, f64); 4] = [
    ("127.2%", 1.272),
    ("161.8%", 1.618),
    ("200%", 2.0),
    ("261.8%", 2.618),
];

const CLOSE_EXTENSIONS: [(&str, f64); 3] = [("23.6%", 0.236), ("38.2%", 0.382), ("61.8%", 0.618)];

/// Levels over the swing of the last `window` sessions.
///
/// The Classic swing is measured on closes and its extensions are projected both ways from
/// the latest close. The Extended swing uses true highs and lows, keeps the 0% and 100%
/// endpoints, and projects extensions in the direction of the last close-to-close move.
pub struct FibonacciProjector {
    name: String,
    policy: AnalysisPolicy,
    window: usize,
}

impl FibonacciProjector {
    pub fn new(params: &PolicyParams) -> Self {
        Self {
            name: format!("Fibonacci({})", params.fibonacci_window),
            policy: params.policy,
            window: params.fibonacci_window,
        }
    }
}

impl LevelCalculator for FibonacciProjector {
    type Output = Option<FibonacciLevels>;

    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "policy": self.policy, "window": self.window })
    }

    fn calculate(&self, bars: &BarSeries) -> Option<FibonacciLevels> {
        if self.window == 0 || bars.len() < self.window {
            return None;
        }
        let latest = bars.latest()?;
        let previous = bars.previous()?;
        let swing = bars.recent(self.window);

        let (swing_high, swing_low) = match self.policy {
            AnalysisPolicy::Classic => swing
                .iter()
                .fold((f64::MIN, f64::MAX), |(hi, lo), bar| (hi.max(bar.close), lo.min(bar.close))),
            AnalysisPolicy::Extended => swing
                .iter()
                .fold((f64::MIN, f64::MAX), |(hi, lo), bar| (hi.max(bar.high), lo.min(bar.low))),
        };
        let diff = swing_high - swing_low;
        if diff <= 0.0 {
            // flat window, nothing to project
            return None;
        }
        let is_uptrend = latest.close > previous.close;

        let mut retracements: Vec<PriceLevel> = RETRACEMENTS
            .iter()
            .map(|&(label, ratio)| PriceLevel::new(label, swing_high - diff * ratio))
            .collect();

        let mut extensions: Vec<PriceLevel> = match self.policy {
            AnalysisPolicy::Classic => CLOSE_EXTENSIONS
                .iter()
                .flat_map(|&(label, ratio)| {
                    [
                        PriceLevel::new(format!("{}_up", label), latest.close + diff * ratio),
                        PriceLevel::new(format!("{}_down", label), latest.close - diff * ratio),
                    ]
                })
                .collect(),
            AnalysisPolicy::Extended => {
                retracements.push(PriceLevel::new("0%", swing_high));
                retracements.push(PriceLevel::new("100%", swing_low));
                let (base, direction) = if is_uptrend { (swing_low, 1.0) } else { (swing_high, -1.0) };
                SWING_EXTENSIONS
                    .iter()
                    .map(|&(label, ratio)| PriceLevel::new(label, base + diff * ratio * direction))
                    .collect()
            }
        };
        sort_ascending(&mut retracements);
        sort_ascending(&mut extensions);

        Some(FibonacciLevels {
            swing_high,
            swing_low,
            is_uptrend,
            retracements,
            extensions,
        })
    }
}
