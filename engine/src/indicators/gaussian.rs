// Gaussian band: mean and population standard deviation of recent closes
use super::LevelCalculator;
use crate::config::PolicyParams;
use serde_json::Value;
use shared::models::{AnalysisPolicy, BarSeries};
use shared::snapshot::{sort_ascending, GaussianBand, PriceLevel};

pub struct GaussianBandEstimator {
    name: String,
    policy: AnalysisPolicy,
    window: usize,
}

impl GaussianBandEstimator {
    pub fn new(params: &PolicyParams) -> Self {
        Self {
            name: format!("Gauss({})", params.gaussian_window),
            policy: params.policy,
            window: params.gaussian_window,
        }
    }

    // Extended measures from the mean out to 3σ, Classic from the latest close out to 4σ
    fn center_and_multiples(&self, mean: f64, latest_close: f64) -> (f64, &'static str, u32) {
        match self.policy {
            AnalysisPolicy::Classic => (latest_close, "Close", 4),
            AnalysisPolicy::Extended => (mean, "μ", 3),
        }
    }
}

/// Mean and population standard deviation; `None` for an empty slice.
pub fn mean_and_std_dev(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

impl LevelCalculator for GaussianBandEstimator {
    type Output = Option<GaussianBand>;

    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "policy": self.policy, "window": self.window })
    }

    fn calculate(&self, bars: &BarSeries) -> Option<GaussianBand> {
        let latest = bars.latest()?;
        let closes = bars.recent_closes(self.window);
        let (mean, std_dev) = mean_and_std_dev(&closes)?;
        let (center, center_label, multiples) = self.center_and_multiples(mean, latest.close);

        let mut levels = vec![PriceLevel::new(center_label, center)];
        for k in 1..=multiples {
            let offset = k as f64 * std_dev;
            levels.push(PriceLevel::new(format!("+{}σ", k), center + offset));
            levels.push(PriceLevel::new(format!("-{}σ", k), center - offset));
        }
        sort_ascending(&mut levels);

        Some(GaussianBand {
            equilibrium: mean,
            std_dev,
            center,
            levels,
        })
    }
}
