use super::{BasePatternHandler, ExecutionContext, ExecutionResult, PatternHandler};
use crate::config::HandlerConfig;
use crate::detector;
use crate::error::{ExecutionError, ExecutionFailure, ValidationError};
use crate::execution;
use crate::selector::select_vendor;
use crate::store::{PatternRecord, PatternStore};
use crate::validation;
use async_trait::async_trait;
use llm::{ChatOptions, ChatRequest, VendorsManager};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Name the standard handler registers under.
pub const STANDARD_HANDLER_NAME: &str = "Standard Pattern Handler";

/// Handler for ordinary prompt patterns.
///
/// Runs both validation tiers, routes the call to a vendor chosen by model
/// name and dispatches it synchronously or as a stream.
pub struct StandardPatternHandler {
    base: BasePatternHandler,
    vendors: Arc<VendorsManager>,
    store: Arc<dyn PatternStore>,
}

impl StandardPatternHandler {
    pub fn new(
        vendors: Arc<VendorsManager>,
        store: Arc<dyn PatternStore>,
        config: HandlerConfig,
    ) -> Self {
        Self {
            base: BasePatternHandler::new(STANDARD_HANDLER_NAME, config),
            vendors,
            store,
        }
    }

    /// Build with configuration read from `STANDARD_PATTERN_HANDLER_*`.
    pub fn from_env(
        vendors: Arc<VendorsManager>,
        store: Arc<dyn PatternStore>,
    ) -> utils::Result<Self> {
        let config = HandlerConfig::for_handler(STANDARD_HANDLER_NAME)?;
        Ok(Self::new(vendors, store, config))
    }

    pub fn vendors(&self) -> &VendorsManager {
        &self.vendors
    }

    pub fn store(&self) -> &dyn PatternStore {
        self.store.as_ref()
    }

    /// Validation outcome for execution: a non-blocking warning is handed
    /// back instead of failing.
    fn check_before_execution(
        &self,
        pattern: &PatternRecord,
    ) -> Result<Option<ValidationError>, ExecutionError> {
        match self.validate_pattern(Some(pattern)) {
            Ok(()) => Ok(None),
            Err(finding) if finding.is_warning() && !self.config().block_on_warnings => {
                warn!(
                    "Pattern '{}' has a validation warning, continuing: {}",
                    pattern.name, finding.message
                );
                Ok(Some(finding))
            }
            Err(finding) => Err(self.base.execution_error(&pattern.name, None, finding.into())),
        }
    }
}

#[async_trait]
impl PatternHandler for StandardPatternHandler {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn config(&self) -> &HandlerConfig {
        self.base.config()
    }

    fn validate_pattern(&self, pattern: Option<&PatternRecord>) -> Result<(), ValidationError> {
        self.base.validate_pattern(pattern)?;

        if !self.config().enable_validation {
            return Ok(());
        }

        // base tier guarantees a pattern is present here
        let Some(pattern) = pattern else {
            return Ok(());
        };

        validation::validate_structure(&pattern.name, self.store.as_ref())?;
        validation::validate_content(pattern)
    }

    async fn execute_pattern(
        &self,
        pattern: &PatternRecord,
        request: Option<&ChatRequest>,
        options: Option<&ChatOptions>,
        ctx: &ExecutionContext,
    ) -> Result<ExecutionResult, ExecutionError> {
        let started = Instant::now();

        let warning = self.check_before_execution(pattern)?;

        let model = options.map(|o| o.model.as_str()).unwrap_or_default();
        let vendor = select_vendor(&self.vendors, model).await.ok_or_else(|| {
            self.base.execution_error(
                &pattern.name,
                None,
                ExecutionFailure::NoVendor {
                    model: model.to_string(),
                },
            )
        })?;
        let vendor_name = vendor.name().to_string();

        let session = execution::build_session(pattern, request);
        if session.is_empty() {
            return Err(self.base.execution_error(
                &pattern.name,
                Some(&vendor_name),
                ExecutionFailure::NoMessages,
            ));
        }

        let fail = |cause: ExecutionFailure| {
            if let ExecutionFailure::Vendor(e) = &cause {
                warn!(
                    "Vendor '{}' failed on pattern '{}' (retryable: {}): {}",
                    vendor_name,
                    pattern.name,
                    e.is_retryable(),
                    e
                );
            }
            self.base.execution_error(&pattern.name, Some(&vendor_name), cause)
        };

        let mut result = ExecutionResult::default();
        match options {
            Some(opts) if self.supports_streaming() => {
                debug!("Executing pattern '{}' via streaming", pattern.name);
                let (content, summary) = execution::send_streaming(
                    vendor,
                    session.into_messages(),
                    opts.clone(),
                    ctx,
                )
                .await
                .map_err(fail)?;
                result.content = content;
                result.stream = Some(summary);
            }
            _ => {
                debug!("Executing pattern '{}' synchronously", pattern.name);
                let defaults = ChatOptions::default();
                let opts = options.unwrap_or(&defaults);
                result.content =
                    execution::send_sync(vendor.as_ref(), session.vendor_messages(), opts, ctx)
                        .await
                        .map_err(fail)?;
            }
        }

        result.elapsed = started.elapsed();
        result.metadata.insert("vendor".into(), Value::String(vendor_name.clone()));
        result.metadata.insert("model".into(), Value::String(model.to_string()));
        result
            .metadata
            .insert("pattern_name".into(), Value::String(pattern.name.clone()));
        result
            .metadata
            .insert("handler".into(), Value::String(self.name().to_string()));
        if let Some(finding) = warning {
            result
                .metadata
                .insert("validation_warning".into(), Value::String(finding.message));
        }

        info!(
            "Executed pattern '{}' with vendor '{}' in {:?}",
            pattern.name, vendor_name, result.elapsed
        );

        Ok(result)
    }

    fn supported_pattern_types(&self) -> &[&'static str] {
        &[detector::STANDARD, detector::DEFAULT]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationSeverity;
    use crate::store::{FsPatternStore, StoreConfig};
    use std::fs;
    use tempfile::TempDir;

    fn handler_with(dir: &TempDir, config: HandlerConfig) -> StandardPatternHandler {
        let store = FsPatternStore::new(StoreConfig::new(dir.path()));
        StandardPatternHandler::new(Arc::new(VendorsManager::new()), Arc::new(store), config)
    }

    fn add_pattern(dir: &TempDir, name: &str) {
        fs::create_dir_all(dir.path().join(name)).unwrap();
        fs::write(dir.path().join(name).join("system.md"), "x").unwrap();
    }

    #[test]
    fn test_capabilities() {
        let dir = TempDir::new().unwrap();
        let handler = handler_with(&dir, HandlerConfig::default());

        assert_eq!(handler.name(), STANDARD_HANDLER_NAME);
        assert!(handler.supports_streaming());
        assert!(!handler.supports_file_operations());

        let descriptor = handler.descriptor();
        assert!(descriptor.supported_types.contains("standard"));
        assert!(descriptor.supported_types.contains("default"));
        assert_eq!(descriptor.supported_types.len(), 2);
    }

    #[test]
    fn test_validate_named_pattern_layout() {
        let dir = TempDir::new().unwrap();
        add_pattern(&dir, "summarize");
        let handler = handler_with(&dir, HandlerConfig::default());

        assert!(handler
            .validate_pattern(Some(&PatternRecord::new("summarize", "# Summary\nDo it.")))
            .is_ok());

        let err = handler
            .validate_pattern(Some(&PatternRecord::new("nope", "content")))
            .unwrap_err();
        assert_eq!(err.field, "directory");
    }

    #[test]
    fn test_validate_base_tier_runs_first() {
        let dir = TempDir::new().unwrap();
        let handler = handler_with(&dir, HandlerConfig::default());

        let err = handler.validate_pattern(None).unwrap_err();
        assert_eq!(err.severity, ValidationSeverity::Critical);

        let err = handler
            .validate_pattern(Some(&PatternRecord::new("", "content")))
            .unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_validate_content_warning() {
        let dir = TempDir::new().unwrap();
        add_pattern(&dir, "templ");
        let handler = handler_with(&dir, HandlerConfig::default());

        let err = handler
            .validate_pattern(Some(&PatternRecord::new("templ", "Hello {{name")))
            .unwrap_err();
        assert!(err.is_warning());
    }

    #[test]
    fn test_validation_disabled_skips_both_tiers() {
        let dir = TempDir::new().unwrap();
        let handler = handler_with(&dir, HandlerConfig::default().with_validation(false));

        assert!(handler.validate_pattern(None).is_ok());
        assert!(handler
            .validate_pattern(Some(&PatternRecord::new("missing", "#bad")))
            .is_ok());
    }

    #[tokio::test]
    async fn test_no_vendor_is_recoverable() {
        let dir = TempDir::new().unwrap();
        add_pattern(&dir, "test");
        let handler = handler_with(&dir, HandlerConfig::default());

        let options = ChatOptions::new("non-existent-model");
        let err = handler
            .execute_pattern(
                &PatternRecord::new("test", "You are a helpful assistant."),
                Some(&ChatRequest::with_user_message("Hello")),
                Some(&options),
                &ExecutionContext::new(),
            )
            .await
            .unwrap_err();

        assert!(err.recoverable);
        assert!(matches!(err.cause, ExecutionFailure::NoVendor { .. }));
        assert!(err.vendor_name.is_none());
    }

    #[tokio::test]
    async fn test_blocking_warning_aborts_execution() {
        let dir = TempDir::new().unwrap();
        add_pattern(&dir, "templ");
        let handler = handler_with(&dir, HandlerConfig::default());

        let err = handler
            .execute_pattern(
                &PatternRecord::new("templ", "Hello {{name"),
                None,
                None,
                &ExecutionContext::new(),
            )
            .await
            .unwrap_err();

        assert!(!err.recoverable);
        assert!(err.validation().is_some_and(|v| v.is_warning()));
    }

    #[tokio::test]
    async fn test_failures_are_returned_as_err_not_in_result() {
        let dir = TempDir::new().unwrap();
        add_pattern(&dir, "test");
        let handler = handler_with(&dir, HandlerConfig::default());

        let outcome = handler
            .execute_pattern(
                &PatternRecord::new("test", "You are a helpful assistant."),
                Some(&ChatRequest::with_user_message("Hello")),
                None,
                &ExecutionContext::new(),
            )
            .await;
        let err = outcome.unwrap_err();
        assert!(matches!(err.cause, ExecutionFailure::NoVendor { .. }));

        // a caller folding the failure into a result gets it back from process_result
        let folded = ExecutionResult::from(err.clone());
        assert!(folded.is_err());
        assert!(folded.content.is_empty());
        let processed = handler.process_result(&folded, None).unwrap_err();
        assert_eq!(processed.to_string(), err.to_string());
    }
}
