//! Handler configuration.
//!
//! A handler receives its toggles once, at construction time, as an
//! immutable [`HandlerConfig`]. The value can be built in code, deserialized
//! from a YAML/JSON file, or read from environment variables named after the
//! handler:
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `<PREFIX>ENABLE_STREAMING` | `enable_streaming` | `true` |
//! | `<PREFIX>ENABLE_VALIDATION` | `enable_validation` | `true` |
//! | `<PREFIX>MAX_CONTEXT_LENGTH` | `max_context_length` | `0` (unlimited) |
//! | `<PREFIX>BLOCK_ON_WARNINGS` | `block_on_warnings` | `true` |
//!
//! where `<PREFIX>` is [`utils::env_prefix`] of the handler name, e.g.
//! `STANDARD_PATTERN_HANDLER_`.

use serde::{Deserialize, Serialize};
use utils::config::{env_bool, env_parse, env_prefix, FromEnv};

/// Immutable toggles for one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Use the streaming path when execution options are supplied.
    pub enable_streaming: bool,

    /// Run validation at all.
    pub enable_validation: bool,

    /// Maximum pattern content length in characters; 0 means unlimited.
    pub max_context_length: usize,

    /// Treat `warning` findings as execution-fatal.
    pub block_on_warnings: bool,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            enable_streaming: true,
            enable_validation: true,
            max_context_length: 0,
            block_on_warnings: true,
        }
    }
}

impl HandlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.enable_streaming = enabled;
        self
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.enable_validation = enabled;
        self
    }

    pub fn with_max_context_length(mut self, max_context_length: usize) -> Self {
        self.max_context_length = max_context_length;
        self
    }

    pub fn with_block_on_warnings(mut self, block: bool) -> Self {
        self.block_on_warnings = block;
        self
    }

    /// Load from the environment variables belonging to `handler_name`.
    pub fn for_handler(handler_name: &str) -> utils::Result<Self> {
        Self::from_env(&env_prefix(handler_name))
    }
}

impl FromEnv for HandlerConfig {
    fn from_env(prefix: &str) -> utils::Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            enable_streaming: env_bool(&format!("{prefix}ENABLE_STREAMING"))?
                .unwrap_or(defaults.enable_streaming),
            enable_validation: env_bool(&format!("{prefix}ENABLE_VALIDATION"))?
                .unwrap_or(defaults.enable_validation),
            max_context_length: env_parse(&format!("{prefix}MAX_CONTEXT_LENGTH"))?
                .unwrap_or(defaults.max_context_length),
            block_on_warnings: env_bool(&format!("{prefix}BLOCK_ON_WARNINGS"))?
                .unwrap_or(defaults.block_on_warnings),
        })
    }
}
