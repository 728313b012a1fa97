//! Configuration helpers shared by the pattern workspace.
//!
//! Handlers, the pattern store and the CLI all read their settings the same
//! way: optional environment variables under a common prefix, or a YAML/JSON
//! file deserialized with serde.
//!
//! ```rust,ignore
//! use utils::config::{env_prefix, env_bool, env_parse};
//!
//! let prefix = env_prefix("Standard Pattern Handler");
//! assert_eq!(prefix, "STANDARD_PATTERN_HANDLER_");
//!
//! let streaming = env_bool(&format!("{prefix}ENABLE_STREAMING"))?.unwrap_or(true);
//! let max_len: usize = env_parse(&format!("{prefix}MAX_CONTEXT_LENGTH"))?.unwrap_or(0);
//! ```

pub mod config;
pub mod error;

pub use config::{
    env_bool, env_parse, env_prefix, env_string, load_config_file, load_json_config,
    load_yaml_config, FromEnv,
};
pub use error::{Result, UtilsError};
