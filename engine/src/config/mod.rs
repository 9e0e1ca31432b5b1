// Engine configuration: policy constants and the optional JSON settings file.
pub mod policy;
pub mod settings;

pub use policy::PolicyParams;
pub use settings::EngineSettings;
