//! Error types for configuration helpers.

use thiserror::Error;

/// Result type for utility operations.
pub type Result<T> = std::result::Result<T, UtilsError>;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum UtilsError {
    /// A value was present but could not be interpreted.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for UtilsError {
    fn from(err: serde_json::Error) -> Self {
        UtilsError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for UtilsError {
    fn from(err: serde_yaml::Error) -> Self {
        UtilsError::SerializationError(err.to_string())
    }
}
