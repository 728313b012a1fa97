//! Pattern handlers.
//!
//! A handler combines validation and execution for one family of patterns.
//! The set of implementations is closed and small:
//!
//! - [`BasePatternHandler`] - base-tier validation only; it cannot execute.
//! - [`StandardPatternHandler`] - both validation tiers and the full
//!   vendor-routed execution pipeline.
//!
//! Handlers are built once with an immutable [`HandlerConfig`] and shared
//! as `Arc<dyn PatternHandler>` for the life of the process.

mod base;
mod standard;

pub use base::BasePatternHandler;
pub use standard::{StandardPatternHandler, STANDARD_HANDLER_NAME};

use crate::config::HandlerConfig;
use crate::error::{ExecutionError, ValidationError};
use crate::store::PatternRecord;
use async_trait::async_trait;
use llm::{ChatOptions, ChatRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Static capabilities of a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerDescriptor {
    pub name: String,
    pub supported_types: BTreeSet<String>,
    pub supports_streaming: bool,
    pub supports_file_ops: bool,
}

/// A change to a file produced by a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub operation: String,
    pub content: String,
}

/// Summary of a streamed response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSummary {
    /// Fragments received from the vendor.
    pub fragments: usize,
}

/// Outcome of one execution, owned by the caller.
///
/// `execute_pattern` reports failures as `Err(ExecutionError)` and never
/// returns a result with `error` set. The field is filled when a caller
/// folds a failure into a result with `ExecutionResult::from`, so that
/// successes and failures can be stored or handed to
/// [`PatternHandler::process_result`] uniformly. `content` is empty whenever
/// `error` is set.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    pub content: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub file_changes: Vec<FileChange>,
    /// Present when the response arrived over the streaming path.
    pub stream: Option<StreamSummary>,
    pub error: Option<ExecutionError>,
    pub elapsed: Duration,
}

impl ExecutionResult {
    /// Whether the execution failed.
    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

impl From<ExecutionError> for ExecutionResult {
    fn from(error: ExecutionError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

/// Per-call execution scope.
///
/// Carries the caller's cancellation token and, optionally, a sink that
/// receives each streamed fragment as it arrives.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub cancellation: CancellationToken,
    pub fragment_sink: Option<mpsc::UnboundedSender<String>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_fragment_sink(mut self, sink: mpsc::UnboundedSender<String>) -> Self {
        self.fragment_sink = Some(sink);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl fmt::Debug for dyn PatternHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternHandler")
            .field("name", &self.name())
            .finish()
    }
}

/// Validation plus execution for a family of patterns.
#[async_trait]
pub trait PatternHandler: Send + Sync {
    /// Handler name, used as `handler_type` in errors.
    fn name(&self) -> &str;

    fn config(&self) -> &HandlerConfig;

    /// Check a pattern, returning the first finding.
    fn validate_pattern(&self, pattern: Option<&PatternRecord>) -> Result<(), ValidationError>;

    /// Run a pattern against a vendor.
    async fn execute_pattern(
        &self,
        pattern: &PatternRecord,
        request: Option<&ChatRequest>,
        options: Option<&ChatOptions>,
        ctx: &ExecutionContext,
    ) -> Result<ExecutionResult, ExecutionError>;

    /// Turn a result into the text handed back to the caller.
    fn process_result(
        &self,
        result: &ExecutionResult,
        _options: Option<&ChatOptions>,
    ) -> Result<String, ExecutionError> {
        match &result.error {
            Some(err) => Err(err.clone()),
            None => Ok(result.content.clone()),
        }
    }

    fn supports_streaming(&self) -> bool {
        self.config().enable_streaming
    }

    fn supports_file_operations(&self) -> bool {
        false
    }

    /// Pattern type tags this handler accepts.
    fn supported_pattern_types(&self) -> &[&'static str];

    fn descriptor(&self) -> HandlerDescriptor {
        HandlerDescriptor {
            name: self.name().to_string(),
            supported_types: self
                .supported_pattern_types()
                .iter()
                .map(|t| t.to_string())
                .collect(),
            supports_streaming: self.supports_streaming(),
            supports_file_ops: self.supports_file_operations(),
        }
    }
}
