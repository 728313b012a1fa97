//! Structured errors for validation, execution, the registry and the store.
//!
//! Validation and execution failures are values handed back to the caller.
//! Severity and recoverability are attached data; nothing in this crate
//! escalates or downgrades them.

use llm::LlmError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Ordinal classification of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    /// Advisory finding.
    Warning,
    /// The pattern is unusable as-is.
    Error,
    /// There is no pattern to validate at all.
    Critical,
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationSeverity::Warning => write!(f, "warning"),
            ValidationSeverity::Error => write!(f, "error"),
            ValidationSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pattern validation error for '{pattern_name}' field '{field}': {message}")]
pub struct ValidationError {
    pub pattern_name: String,
    pub field: String,
    pub message: String,
    pub severity: ValidationSeverity,
}

impl ValidationError {
    pub fn new(
        pattern_name: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
        severity: ValidationSeverity,
    ) -> Self {
        Self {
            pattern_name: pattern_name.into(),
            field: field.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn warning(
        pattern_name: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(pattern_name, field, message, ValidationSeverity::Warning)
    }

    pub fn error(
        pattern_name: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(pattern_name, field, message, ValidationSeverity::Error)
    }

    pub fn critical(
        pattern_name: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(pattern_name, field, message, ValidationSeverity::Critical)
    }

    pub fn is_warning(&self) -> bool {
        self.severity == ValidationSeverity::Warning
    }
}

/// Why an execution failed.
#[derive(Debug, Clone, Error)]
pub enum ExecutionFailure {
    /// The pattern did not pass the handler's validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No vendor could serve the requested model.
    #[error("no suitable AI vendor found for model: {model}")]
    NoVendor { model: String },

    /// Neither pattern content nor a caller message was available.
    #[error("no messages to send to AI vendor")]
    NoMessages,

    /// The vendor call itself failed.
    #[error(transparent)]
    Vendor(#[from] LlmError),

    /// The caller cancelled the execution.
    #[error("execution cancelled")]
    Cancelled,

    /// The streaming producer task did not finish normally.
    #[error("streaming producer failed: {0}")]
    Producer(String),

    /// The handler has no execution pipeline.
    #[error("pattern execution is not implemented by this handler")]
    NotImplemented,
}

impl ExecutionFailure {
    /// Whether retrying (possibly with another model/vendor) may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExecutionFailure::NoVendor { .. } | ExecutionFailure::Vendor(_)
        )
    }
}

/// A failed pattern execution.
#[derive(Debug, Clone, Error)]
#[error(
    "pattern execution error for '{}' using handler '{}' and vendor '{}': {}",
    .pattern_name,
    .handler_type,
    .vendor_name.as_deref().unwrap_or(""),
    .cause
)]
pub struct ExecutionError {
    pub pattern_name: String,
    pub handler_type: String,
    pub vendor_name: Option<String>,
    #[source]
    pub cause: ExecutionFailure,
    pub recoverable: bool,
}

impl ExecutionError {
    /// Wrap `cause`, deriving recoverability from it.
    pub fn new(
        pattern_name: impl Into<String>,
        handler_type: impl Into<String>,
        vendor_name: Option<String>,
        cause: ExecutionFailure,
    ) -> Self {
        let recoverable = cause.is_recoverable();
        Self {
            pattern_name: pattern_name.into(),
            handler_type: handler_type.into(),
            vendor_name,
            cause,
            recoverable,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.cause, ExecutionFailure::Cancelled)
    }

    /// Whether the vendor reported a transient failure, so the same vendor
    /// may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(&self.cause, ExecutionFailure::Vendor(e) if e.is_retryable())
    }

    /// The validation finding behind this error, if any.
    pub fn validation(&self) -> Option<&ValidationError> {
        match &self.cause {
            ExecutionFailure::Validation(v) => Some(v),
            _ => None,
        }
    }
}

/// Errors from the handler registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("handler name cannot be empty")]
    EmptyName,

    #[error("handler '{0}' already registered")]
    Duplicate(String),

    #[error("handler '{0}' not found")]
    NotFound(String),

    #[error("registry lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Errors from the pattern store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("pattern '{0}' not found")]
    NotFound(String),

    #[error("invalid pattern name: {0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
