use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One trading session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl MarketBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self { date, open, high, low, close }
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// True when every price is finite and strictly positive.
    pub fn has_positive_prices(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

/// Daily history ordered most recent first, one bar per date.
///
/// The ordering is established once at construction and never changes; calculators
/// that need a different order work on their own copies.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BarSeries {
    bars: Vec<MarketBar>,
}

impl BarSeries {
    /// Sorts descending by date and drops repeated dates, keeping the first occurrence.
    pub fn from_unordered(mut bars: Vec<MarketBar>) -> Self {
        // sort_by is stable, so the first occurrence of a date stays in front for dedup
        bars.sort_by(|a, b| b.date.cmp(&a.date));
        bars.dedup_by_key(|bar| bar.date);
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn as_slice(&self) -> &[MarketBar] {
        &self.bars
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MarketBar> {
        self.bars.iter()
    }

    /// The most recent session.
    pub fn latest(&self) -> Option<&MarketBar> {
        self.bars.first()
    }

    /// The session before the most recent one.
    pub fn previous(&self) -> Option<&MarketBar> {
        self.bars.get(1)
    }

    /// The `count` most recent bars, or the whole series when it is shorter.
    pub fn recent(&self, count: usize) -> &[MarketBar] {
        &self.bars[..count.min(self.bars.len())]
    }

    /// Closes of the `count` most recent bars, most recent first.
    pub fn recent_closes(&self, count: usize) -> Vec<f64> {
        self.recent(count).iter().map(|bar| bar.close).collect()
    }
}

impl<'a> IntoIterator for &'a BarSeries {
    type Item = &'a MarketBar;
    type IntoIter = std::slice::Iter<'a, MarketBar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}

/// Which calculator family produces a snapshot.
///
/// `Classic` is the compact calculator (3 pivot levels, close-based swings, bands around
/// the close); `Extended` is the richer one (4 pivot levels, high/low swings, bands around
/// the mean).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisPolicy {
    Classic,
    #[default]
    Extended,
}

impl fmt::Display for AnalysisPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisPolicy::Classic => write!(f, "classic"),
            AnalysisPolicy::Extended => write!(f, "extended"),
        }
    }
}
