//! Error types for Heart IQ

use thiserror::Error;

/// Result type alias for Heart IQ operations
pub type Result<T> = std::result::Result<T, HeartIqError>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum HeartIqError {
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Unknown category {value} in column '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    #[error("Unknown class index: {0}")]
    UnknownClass(usize),

    #[error("Model artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Model artifact corrupt: {0}")]
    ArtifactCorrupt(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Plot error: {0}")]
    PlotError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for HeartIqError {
    fn from(err: polars::error::PolarsError) -> Self {
        HeartIqError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for HeartIqError {
    fn from(err: serde_json::Error) -> Self {
        HeartIqError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for HeartIqError {
    fn from(err: ndarray::ShapeError) -> Self {
        HeartIqError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
