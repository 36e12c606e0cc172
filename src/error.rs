use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(String),

    #[error("Parsing error: {0}")]
    ParsingError(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Resource not found: {0}")]
    NotFoundError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

// Helper functions for creating specific errors
impl PipelineError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PipelineError::ConfigError(msg.into())
    }

    pub fn spreadsheet<S: Into<String>>(msg: S) -> Self {
        PipelineError::SpreadsheetError(msg.into())
    }

    pub fn parsing<S: Into<String>>(msg: S) -> Self {
        PipelineError::ParsingError(msg.into())
    }

    pub fn schema<S: Into<String>>(msg: S) -> Self {
        PipelineError::SchemaError(msg.into())
    }

    pub fn storage<S: Into<String>>(msg: S) -> Self {
        PipelineError::StorageError(msg.into())
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        PipelineError::NotFoundError(msg.into())
    }

    pub fn internal<S: Into<String>>(msg: S) -> Self {
        PipelineError::InternalError(msg.into())
    }
}
