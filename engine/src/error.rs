use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Input format error: {0}")]
    InputFormatError(String),

    #[error("The input holds no data")]
    EmptyInput,

    #[error("At least 2 valid sessions are required, found {found}")]
    InsufficientData { found: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;
