pub mod models;
pub mod snapshot;
pub mod utils;

// Value types only; no engine logic in this crate
pub use models::{AnalysisPolicy, BarSeries, MarketBar};
pub use snapshot::AnalysisSnapshot;
