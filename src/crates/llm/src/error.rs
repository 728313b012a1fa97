//! Error types for vendors and the vendor directory.

use thiserror::Error;

/// Result type for vendor operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur when talking to a vendor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    /// Failed to serialize/deserialize data.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Vendor service unavailable.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Request timeout.
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// The fragment sink was closed before the stream finished.
    #[error("Stream closed: {0}")]
    StreamClosed(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LlmError {
    /// Whether the failure is transient, so the same call may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::ServiceUnavailable(_) | LlmError::Timeout(_))
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::SerializationError(err.to_string())
    }
}
