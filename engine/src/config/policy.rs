// Numeric constants for each analysis policy.
use serde::Serialize;
use shared::models::AnalysisPolicy;

/// Minimum history for any snapshot at all.
pub const MIN_SESSIONS: usize = 2;

/// Everything a calculator needs to know about the active policy.
///
/// Structural differences (which pivot formulas, what the Gaussian band is centered on)
/// are decided by `policy`; the window sizes and multipliers live here so they can be
/// overridden from the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolicyParams {
    pub policy: AnalysisPolicy,
    pub historical_lookback: usize,
    pub historical_level_count: usize,
    pub fibonacci_window: usize,
    pub gaussian_window: usize,
    pub long_term_ma_period: usize,
    pub atr_period: usize,
    pub atr_stop_multiplier: f64,
    /// Share of the session range covered by the trap zones.
    pub trap_range_fraction: f64,
}

impl PolicyParams {
    pub fn for_policy(policy: AnalysisPolicy) -> Self {
        match policy {
            AnalysisPolicy::Classic => Self::classic(),
            AnalysisPolicy::Extended => Self::extended(),
        }
    }

    pub fn classic() -> Self {
        PolicyParams {
            policy: AnalysisPolicy::Classic,
            historical_lookback: 100,
            historical_level_count: 4,
            fibonacci_window: 10,
            gaussian_window: 20,
            long_term_ma_period: 50,
            atr_period: 14,
            atr_stop_multiplier: 2.0,
            trap_range_fraction: 0.10,
        }
    }

    pub fn extended() -> Self {
        PolicyParams {
            policy: AnalysisPolicy::Extended,
            historical_lookback: 150,
            historical_level_count: 6,
            fibonacci_window: 20,
            gaussian_window: 20,
            long_term_ma_period: 50,
            atr_period: 14,
            atr_stop_multiplier: 1.5,
            trap_range_fraction: 0.15,
        }
    }
}

impl Default for PolicyParams {
    fn default() -> Self {
        Self::for_policy(AnalysisPolicy::default())
    }
}
