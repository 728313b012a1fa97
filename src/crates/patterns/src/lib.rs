//! Pattern handler core
//!
//! Routes prompt *patterns* to interchangeable text-generation vendors.
//!
//! - [`PatternRegistry`] - thread-safe directory of handlers; picks one per
//!   pattern using an ordered chain of type detectors
//! - [`PatternHandler`] - validation plus execution for a family of patterns,
//!   with [`BasePatternHandler`] and [`StandardPatternHandler`] shipped
//! - [`validation`] - tiered checks producing [`ValidationError`]s with a
//!   severity
//! - [`execution`] - message assembly and sync or streaming dispatch with
//!   cancellation
//! - [`FsPatternStore`] - patterns stored as `<root>/<name>/system.md`
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use patterns::{
//!     ExecutionContext, FsPatternStore, HandlerConfig, PatternHandler, PatternRegistry,
//!     PatternStore, StandardPatternHandler, StoreConfig,
//! };
//! use llm::{ChatOptions, ChatRequest, VendorsManager};
//! use std::sync::Arc;
//!
//! let store = Arc::new(FsPatternStore::new(StoreConfig::default()));
//! let handler = Arc::new(StandardPatternHandler::new(
//!     Arc::new(vendors),
//!     store.clone(),
//!     HandlerConfig::default(),
//! ));
//!
//! let registry = PatternRegistry::new();
//! registry.register(handler.name(), handler.clone())?;
//!
//! let pattern = store.get_by_name("summarize")?;
//! let handler = registry.select_for_pattern(&pattern)?.expect("handler");
//! let result = handler
//!     .execute_pattern(
//!         &pattern,
//!         Some(&ChatRequest::with_user_message("...")),
//!         Some(&ChatOptions::new("gpt-4o")),
//!         &ExecutionContext::new(),
//!     )
//!     .await?;
//! println!("{}", result.content);
//! ```

pub mod config;
pub mod detector;
pub mod error;
pub mod execution;
pub mod handler;
pub mod registry;
pub mod selector;
pub mod store;
pub mod validation;

pub use config::HandlerConfig;
pub use detector::TypeDetector;
pub use error::{
    ExecutionError, ExecutionFailure, RegistryError, StoreError, ValidationError,
    ValidationSeverity,
};
pub use handler::{
    BasePatternHandler, ExecutionContext, ExecutionResult, FileChange, HandlerDescriptor,
    PatternHandler, StandardPatternHandler, StreamSummary, STANDARD_HANDLER_NAME,
};
pub use registry::PatternRegistry;
pub use selector::select_vendor;
pub use store::{FsPatternStore, PatternRecord, PatternStore, StoreConfig};
