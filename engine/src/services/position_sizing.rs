// Contract sizing for a fixed risk budget
use serde::Serialize;
use std::fmt;

use crate::config::settings::RiskSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionRequest {
    pub capital: f64,
    /// Share of the capital put at risk, in percent (1.0 = 1%).
    pub risk_percent: f64,
    pub stop_points: f64,
    /// Target distance as a multiple of the stop.
    pub target_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizingAlert {
    /// The budget could not pay for one contract; one is taken anyway at this real risk.
    ElevatedRisk { actual_percent: f64 },
    /// The capital does not cover the stop of a single contract.
    InsufficientCapital,
}

impl fmt::Display for SizingAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizingAlert::ElevatedRisk { actual_percent } => write!(f, "Risco real: {:.2}%", actual_percent),
            SizingAlert::InsufficientCapital => write!(f, "Capital insuficiente"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct PositionPlan {
    pub contracts: u64,
    pub risk_value: f64,
    pub gain_value: f64,
    pub reward_ratio: f64,
    pub alert: Option<SizingAlert>,
}

pub struct PositionSizer {
    cost_per_point: f64,
}

impl PositionSizer {
    pub fn new(cost_per_point: f64) -> Self {
        PositionSizer { cost_per_point }
    }

    pub fn from_settings(risk: &RiskSettings) -> Self {
        Self::new(risk.cost_per_point)
    }

    pub fn size(&self, request: &PositionRequest) -> PositionPlan {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.cost_per_point) {
            tracing::warn!(cost_per_point = self.cost_per_point, "Cost per point must be positive");
            return PositionPlan::default();
        }
        if !(positive(request.capital) && positive(request.risk_percent) && positive(request.stop_points)) {
            tracing::debug!(?request, "Position request without capital, risk or stop");
            return PositionPlan::default();
        }

        let max_risk = request.capital * request.risk_percent / 100.0;
        let stop_value = request.stop_points * self.cost_per_point;
        let mut contracts = (max_risk / stop_value).floor() as u64;
        let mut alert = None;

        if contracts < 1 {
            if request.capital >= stop_value {
                contracts = 1;
                alert = Some(SizingAlert::ElevatedRisk {
                    actual_percent: stop_value / request.capital * 100.0,
                });
            } else {
                alert = Some(SizingAlert::InsufficientCapital);
            }
        }

        let risk_value = contracts as f64 * stop_value;
        let gain_value = risk_value * request.target_multiplier;
        let reward_ratio = if risk_value > 0.0 && gain_value > 0.0 {
            (gain_value / risk_value * 100.0).round() / 100.0
        } else {
            0.0
        };

        if let Some(alert) = alert {
            tracing::warn!(%alert, capital = request.capital, stop_value, "Position sizing alert");
        }

        PositionPlan {
            contracts,
            risk_value,
            gain_value,
            reward_ratio,
            alert,
        }
    }
}

impl Default for PositionSizer {
    fn default() -> Self {
        Self::from_settings(&RiskSettings::default())
    }
}
