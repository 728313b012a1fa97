use super::{ExecutionContext, ExecutionResult, PatternHandler};
use crate::config::HandlerConfig;
use crate::detector;
use crate::error::{ExecutionError, ExecutionFailure, ValidationError};
use crate::store::PatternRecord;
use crate::validation;
use async_trait::async_trait;
use llm::{ChatOptions, ChatRequest};

/// Handler providing base-tier validation.
///
/// Execution always fails with a non-recoverable "not implemented" error;
/// specialised handlers embed this one and supply the pipeline.
#[derive(Debug, Clone)]
pub struct BasePatternHandler {
    name: String,
    config: HandlerConfig,
}

impl BasePatternHandler {
    pub fn new(name: impl Into<String>, config: HandlerConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    /// Wrap a failure with this handler's identity.
    pub fn execution_error(
        &self,
        pattern_name: &str,
        vendor_name: Option<&str>,
        cause: ExecutionFailure,
    ) -> ExecutionError {
        ExecutionError::new(
            pattern_name,
            &self.name,
            vendor_name.map(str::to_string),
            cause,
        )
    }
}

#[async_trait]
impl PatternHandler for BasePatternHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> &HandlerConfig {
        &self.config
    }

    fn validate_pattern(&self, pattern: Option<&PatternRecord>) -> Result<(), ValidationError> {
        if !self.config.enable_validation {
            return Ok(());
        }
        validation::validate_base(pattern, self.config.max_context_length)
    }

    async fn execute_pattern(
        &self,
        pattern: &PatternRecord,
        _request: Option<&ChatRequest>,
        _options: Option<&ChatOptions>,
        _ctx: &ExecutionContext,
    ) -> Result<ExecutionResult, ExecutionError> {
        Err(self.execution_error(&pattern.name, None, ExecutionFailure::NotImplemented))
    }

    fn supported_pattern_types(&self) -> &[&'static str] {
        &[detector::STANDARD]
    }
}
