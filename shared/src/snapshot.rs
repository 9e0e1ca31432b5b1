// Output of one analysis run. Every field is raw numeric data; rounding and
// locale formatting are left to whoever presents the snapshot.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::AnalysisPolicy;

/// A price labeled with its role, e.g. `R1` or `61.8%`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub label: String,
    pub value: f64,
}

impl PriceLevel {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self { label: label.into(), value }
    }
}

/// Sorts levels ascending by value; labels move with their values.
pub fn sort_ascending(levels: &mut [PriceLevel]) {
    levels.sort_by(|a, b| a.value.total_cmp(&b.value));
}

/// Closed price interval with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceZone {
    pub start: f64,
    pub end: f64,
}

impl PriceZone {
    /// Builds the interval from two bounds in either order.
    pub fn between(a: f64, b: f64) -> Self {
        Self { start: a.min(b), end: a.max(b) }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.start && price <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousDay {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub range: f64,
    /// Percent change against the prior close; `None` when that close is zero.
    pub variation: Option<f64>,
}

/// Support and resistance taken from prior session extremes.
///
/// Both lists are ascending by value. Labels count outward from the price: `R1` is the
/// lowest resistance and `S1` the highest support, so `supports` reads `Sk .. S1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalLevels {
    pub resistances: Vec<PriceLevel>,
    pub supports: Vec<PriceLevel>,
    /// Distinct resistances found before padding.
    pub distinct_resistances: usize,
    /// Distinct supports found before padding.
    pub distinct_supports: usize,
}

impl HistoricalLevels {
    /// Support by rank, `1` being the nearest to price.
    pub fn support(&self, rank: usize) -> Option<f64> {
        if rank == 0 {
            return None;
        }
        self.supports
            .len()
            .checked_sub(rank)
            .and_then(|idx| self.supports.get(idx))
            .map(|level| level.value)
    }

    /// Resistance by rank, `1` being the nearest to price.
    pub fn resistance(&self, rank: usize) -> Option<f64> {
        rank.checked_sub(1)
            .and_then(|idx| self.resistances.get(idx))
            .map(|level| level.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub p: f64,
    pub resistances: Vec<PriceLevel>,
    pub supports: Vec<PriceLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub swing_high: f64,
    pub swing_low: f64,
    /// Latest close above the previous one.
    pub is_uptrend: bool,
    pub retracements: Vec<PriceLevel>,
    pub extensions: Vec<PriceLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianBand {
    /// Mean of the window closes (μ).
    pub equilibrium: f64,
    /// Population standard deviation of the window closes (σ).
    pub std_dev: f64,
    /// Value the σ multiples are measured from.
    pub center: f64,
    pub levels: Vec<PriceLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtrEstimate {
    pub value: f64,
    pub buy_stop: f64,
    pub sell_stop: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrapZones {
    pub buy_trap: PriceZone,
    pub sell_trap: PriceZone,
    pub seller_defense: PriceZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccumulationZones {
    pub primary: PriceZone,
    pub secondary: Option<PriceZone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub policy: AnalysisPolicy,
    pub operation_date: NaiveDate,
    pub previous_day: PreviousDay,
    pub historical_sr: HistoricalLevels,
    pub pivot_points: PivotLevels,
    pub fibonacci: Option<FibonacciLevels>,
    pub gauss_levels: GaussianBand,
    pub long_term_ma: Option<f64>,
    pub atr: Option<AtrEstimate>,
    pub trap_zones: TrapZones,
    pub accumulation_zones: AccumulationZones,
}
