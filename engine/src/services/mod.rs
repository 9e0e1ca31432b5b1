// Services built on top of the calculators
pub mod analysis_service;
pub mod briefing;
pub mod position_sizing;

pub use analysis_service::{analyze_session, AnalysisEngine};
pub use position_sizing::{PositionPlan, PositionRequest, PositionSizer, SizingAlert};
