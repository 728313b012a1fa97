//! Environment and file based configuration loading.
//!
//! Environment readers distinguish a *missing* variable (`Ok(None)`, the
//! caller keeps its default) from a *malformed* one (`Err`), so a typo in a
//! deployment surfaces instead of silently falling back.

use crate::error::{Result, UtilsError};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Build the environment variable prefix for a named component.
///
/// Upper-cases the name and replaces every run of non-alphanumeric
/// characters with a single underscore, then appends a trailing underscore:
/// `"Standard Pattern Handler"` becomes `"STANDARD_PATTERN_HANDLER_"`.
pub fn env_prefix(name: &str) -> String {
    let mut prefix = String::with_capacity(name.len() + 1);
    let mut pending_sep = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !prefix.is_empty() {
                prefix.push('_');
            }
            pending_sep = false;
            prefix.push(ch.to_ascii_uppercase());
        } else {
            pending_sep = true;
        }
    }

    prefix.push('_');
    prefix
}

/// Read a string variable. Empty values count as missing.
pub fn env_string(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

/// Read and parse a variable.
pub fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = env_string(key) else {
        return Ok(None);
    };

    raw.trim().parse::<T>().map(Some).map_err(|e| {
        UtilsError::ConfigError(format!(
            "Failed to parse environment variable '{}' ({:?}): {}",
            key, raw, e
        ))
    })
}

/// Read a boolean variable (`true/false`, `1/0`, `yes/no`, `on/off`).
pub fn env_bool(key: &str) -> Result<Option<bool>> {
    let Some(raw) = env_string(key) else {
        return Ok(None);
    };

    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(UtilsError::ConfigError(format!(
            "Invalid boolean value for '{}': {}",
            key, raw
        ))),
    }
}

/// Load configuration from a YAML file.
pub fn load_yaml_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path.as_ref())?;
    serde_yaml::from_str(&content).map_err(|e| {
        UtilsError::ConfigError(format!(
            "Failed to parse YAML config from {:?}: {}",
            path.as_ref(),
            e
        ))
    })
}

/// Load configuration from a JSON file.
pub fn load_json_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path.as_ref())?;
    serde_json::from_str(&content).map_err(|e| {
        UtilsError::ConfigError(format!(
            "Failed to parse JSON config from {:?}: {}",
            path.as_ref(),
            e
        ))
    })
}

/// Load configuration from a file, picking the format from its extension.
pub fn load_config_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| {
            UtilsError::ConfigError(format!("Unable to determine file extension for {:?}", path))
        })?;

    tracing::debug!("Loading configuration from {}", path.display());

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => load_yaml_config(path),
        "json" => load_json_config(path),
        _ => Err(UtilsError::ConfigError(format!(
            "Unsupported config file extension: {}",
            extension
        ))),
    }
}

/// Types that can be loaded from environment variables.
///
/// Implementations start from their defaults and override only the
/// variables that are set.
pub trait FromEnv: Sized {
    /// Load configuration from environment variables with the given prefix.
    fn from_env(prefix: &str) -> Result<Self>;
}
