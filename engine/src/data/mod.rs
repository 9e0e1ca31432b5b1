// Ingestion of exported daily histories
pub mod bar_parser;

pub use bar_parser::BarParser;
