//! Handler registry
//!
//! Thread-safe directory of pattern handlers. Selects a handler for a pattern
//! by running the type detector chain and matching the resulting tag against
//! each handler's supported types.

use crate::detector::{self, TypeDetector};
use crate::error::RegistryError;
use crate::handler::PatternHandler;
use crate::store::PatternRecord;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Default)]
struct RegistryState {
    handlers: HashMap<String, Arc<dyn PatternHandler>>,
    default_handler: Option<Arc<dyn PatternHandler>>,
    detectors: Vec<TypeDetector>,
}

/// Registry of pattern handlers.
///
/// Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct PatternRegistry {
    inner: Arc<RwLock<RegistryState>>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, RegistryState>> {
        self.inner.read().map_err(|e| {
            RegistryError::LockPoisoned(format!("Failed to acquire read lock: {}", e))
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, RegistryState>> {
        self.inner.write().map_err(|e| {
            RegistryError::LockPoisoned(format!("Failed to acquire write lock: {}", e))
        })
    }

    /// Register a handler under `name`.
    ///
    /// Fails if the name is empty or already taken; an existing registration
    /// is left untouched.
    pub fn register(&self, name: impl Into<String>, handler: Arc<dyn PatternHandler>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let mut state = self.write()?;
        if state.handlers.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }

        debug!("Registered pattern handler '{}'", name);
        state.handlers.insert(name, handler);
        Ok(())
    }

    /// Remove a handler, returning it.
    pub fn unregister(&self, name: &str) -> Result<Arc<dyn PatternHandler>> {
        self.write()?
            .handlers
            .remove(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn PatternHandler>> {
        self.read()?
            .handlers
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Registered handler names, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.read()?.handlers.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.read()?.handlers.len())
    }

    /// Handler used when no registered handler supports a pattern's type.
    pub fn set_default_handler(&self, handler: Arc<dyn PatternHandler>) -> Result<()> {
        self.write()?.default_handler = Some(handler);
        Ok(())
    }

    pub fn default_handler(&self) -> Result<Option<Arc<dyn PatternHandler>>> {
        Ok(self.read()?.default_handler.clone())
    }

    /// Append a detector to the chain.
    pub fn add_type_detector<F>(&self, detector: F) -> Result<()>
    where
        F: Fn(&PatternRecord) -> Option<String> + Send + Sync + 'static,
    {
        self.write()?.detectors.push(Arc::new(detector));
        Ok(())
    }

    /// Classify a pattern with the detector chain.
    pub fn detect_pattern_type(&self, pattern: &PatternRecord) -> Result<String> {
        // detectors run outside the lock
        let detectors = self.read()?.detectors.clone();
        Ok(detector::detect_with(&detectors, pattern))
    }

    /// Pick a handler for `pattern`.
    ///
    /// Tries a handler supporting the detected type, then the default
    /// handler, then any registered handler.
    pub fn select_for_pattern(
        &self,
        pattern: &PatternRecord,
    ) -> Result<Option<Arc<dyn PatternHandler>>> {
        let pattern_type = self.detect_pattern_type(pattern)?;
        let state = self.read()?;

        let matching = state.handlers.values().find(|handler| {
            handler
                .supported_pattern_types()
                .iter()
                .any(|t| *t == pattern_type)
        });

        let selected = matching
            .or(state.default_handler.as_ref())
            .or_else(|| state.handlers.values().next())
            .cloned();

        debug!(
            "Pattern '{}' detected as '{}', selected handler: {:?}",
            pattern.name,
            pattern_type,
            selected.as_ref().map(|h| h.name().to_string())
        );

        Ok(selected)
    }

    /// Drop all handlers, the default handler and every detector.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.write()?;
        state.handlers.clear();
        state.default_handler = None;
        state.detectors.clear();
        Ok(())
    }
}

impl fmt::Debug for PatternRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("PatternRegistry");
        match self.read() {
            Ok(state) => debug
                .field("handlers", &state.handlers.keys().collect::<Vec<_>>())
                .field("has_default", &state.default_handler.is_some())
                .field("detectors", &state.detectors.len()),
            Err(_) => debug.field("state", &"<poisoned>"),
        };
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HandlerConfig;
    use crate::error::{ExecutionError, ExecutionFailure, ValidationError};
    use crate::handler::{ExecutionContext, ExecutionResult};
    use async_trait::async_trait;
    use llm::{ChatOptions, ChatRequest};
    use std::thread;

    struct MockHandler {
        name: &'static str,
        types: &'static [&'static str],
        config: HandlerConfig,
    }

    fn mock(name: &'static str, types: &'static [&'static str]) -> Arc<dyn PatternHandler> {
        Arc::new(MockHandler {
            name,
            types,
            config: HandlerConfig::default(),
        })
    }

    #[async_trait]
    impl PatternHandler for MockHandler {
        fn name(&self) -> &str {
            self.name
        }

        fn config(&self) -> &HandlerConfig {
            &self.config
        }

        fn validate_pattern(&self, _pattern: Option<&PatternRecord>) -> std::result::Result<(), ValidationError> {
            Ok(())
        }

        async fn execute_pattern(
            &self,
            pattern: &PatternRecord,
            _request: Option<&ChatRequest>,
            _options: Option<&ChatOptions>,
            _ctx: &ExecutionContext,
        ) -> std::result::Result<ExecutionResult, ExecutionError> {
            Err(ExecutionError::new(
                &pattern.name,
                self.name,
                None,
                ExecutionFailure::NotImplemented,
            ))
        }

        fn supported_pattern_types(&self) -> &[&'static str] {
            self.types
        }
    }

    fn record(content: &str) -> PatternRecord {
        PatternRecord::new("p", content)
    }

    #[test]
    fn test_register_and_get() {
        let registry = PatternRegistry::new();
        registry.register("standard", mock("standard", &["standard"])).unwrap();

        assert_eq!(registry.count().unwrap(), 1);
        assert_eq!(registry.get("standard").unwrap().name(), "standard");
        assert_eq!(
            format!("{:?}", registry.get("standard").unwrap()),
            r#"PatternHandler { name: "standard" }"#
        );
        assert!(matches!(
            registry.get("missing"),
            Err(RegistryError::NotFound(ref name)) if name == "missing"
        ));
    }

    #[test]
    fn test_duplicate_registration_keeps_original() {
        let registry = PatternRegistry::new();
        registry.register("h", mock("first", &["standard"])).unwrap();

        let err = registry.register("h", mock("second", &["standard"])).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("h".into()));
        assert_eq!(registry.get("h").unwrap().name(), "first");
        assert_eq!(registry.count().unwrap(), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let registry = PatternRegistry::new();
        assert_eq!(
            registry.register("", mock("x", &[])).unwrap_err(),
            RegistryError::EmptyName
        );
    }

    #[test]
    fn test_unregister_and_list() {
        let registry = PatternRegistry::new();
        registry.register("b", mock("b", &[])).unwrap();
        registry.register("a", mock("a", &[])).unwrap();

        assert_eq!(registry.list().unwrap(), vec!["a", "b"]);

        assert_eq!(registry.unregister("a").unwrap().name(), "a");
        assert_eq!(registry.list().unwrap(), vec!["b"]);
        assert!(matches!(
            registry.unregister("a"),
            Err(RegistryError::NotFound(ref name)) if name == "a"
        ));
    }

    #[test]
    fn test_detector_chain_order() {
        let registry = PatternRegistry::new();
        assert_eq!(registry.detect_pattern_type(&record("stream output")).unwrap(), "streaming");

        registry.add_type_detector(|_| None).unwrap();
        registry.add_type_detector(|_| Some("custom".into())).unwrap();
        registry.add_type_detector(|_| Some("later".into())).unwrap();

        assert_eq!(registry.detect_pattern_type(&record("stream output")).unwrap(), "custom");
    }

    #[test]
    fn test_select_by_supported_type() {
        let registry = PatternRegistry::new();
        registry.register("std", mock("std", &["standard"])).unwrap();
        registry.register("stream", mock("stream", &["streaming"])).unwrap();

        let selected = registry.select_for_pattern(&record("stream this")).unwrap().unwrap();
        assert_eq!(selected.name(), "stream");

        let selected = registry.select_for_pattern(&record("plain")).unwrap().unwrap();
        assert_eq!(selected.name(), "std");
    }

    #[test]
    fn test_select_falls_back_to_default_then_any() {
        let registry = PatternRegistry::new();
        assert!(registry.select_for_pattern(&record("plain")).unwrap().is_none());

        registry.register("files", mock("files", &["file_operation"])).unwrap();
        let selected = registry.select_for_pattern(&record("plain")).unwrap().unwrap();
        assert_eq!(selected.name(), "files");

        registry.set_default_handler(mock("fallback", &[])).unwrap();
        let selected = registry.select_for_pattern(&record("plain")).unwrap().unwrap();
        assert_eq!(selected.name(), "fallback");
    }

    #[test]
    fn test_clear() {
        let registry = PatternRegistry::new();
        registry.register("h", mock("h", &["standard"])).unwrap();
        registry.set_default_handler(mock("d", &[])).unwrap();
        registry.add_type_detector(|_| Some("custom".into())).unwrap();

        registry.clear().unwrap();

        assert_eq!(registry.count().unwrap(), 0);
        assert!(registry.default_handler().unwrap().is_none());
        assert_eq!(registry.detect_pattern_type(&record("plain")).unwrap(), "standard");
    }

    #[test]
    fn test_thread_safety() {
        let registry = PatternRegistry::new();
        let mut handles = vec![];

        for i in 0..10 {
            let registry = registry.clone();
            handles.push(thread::spawn(move || {
                let name: &'static str = Box::leak(format!("handler_{}", i).into_boxed_str());
                registry.register(name, mock(name, &["standard"])).unwrap();
                registry.select_for_pattern(&record("plain")).unwrap();
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.count().unwrap(), 10);
    }
}
