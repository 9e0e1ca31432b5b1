// Reference level calculators
pub mod atr;
pub mod calendar;
pub mod fibonacci;
pub mod gaussian;
pub mod historical_levels;
pub mod pivots;
pub mod sma;
pub mod zones;

pub use atr::AverageTrueRange;
pub use fibonacci::FibonacciProjector;
pub use gaussian::GaussianBandEstimator;
pub use historical_levels::HistoricalLevelExtractor;
pub use pivots::PivotCalculator;
pub use sma::Sma;
pub use zones::ZoneSynthesizer;

use serde_json::Value;
use shared::models::BarSeries;

// Common trait for the calculators that read the bar series directly
pub trait LevelCalculator: Send + Sync {
    type Output;

    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this calculator instance
    fn calculate(&self, bars: &BarSeries) -> Self::Output; // None where history is too short for the level
}
