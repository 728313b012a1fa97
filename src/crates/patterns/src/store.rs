//! Pattern records and the filesystem pattern store.
//!
//! A named pattern lives at `<root>/<name>/<system file>`. Two roots are
//! searched: an optional custom root first, then the primary root, so a
//! custom pattern overrides a stock one with the same name. Names that look
//! like paths (`/`, `\`, `~`, `.` prefixes) are read directly from disk.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use utils::config::{env_string, FromEnv};

/// Default name of the file holding a pattern's system prompt.
pub const DEFAULT_SYSTEM_FILE: &str = "system.md";

/// A pattern as handed to handlers. Read-only once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub name: String,
    pub content: String,
}

impl PatternRecord {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Whether a pattern name refers to a file path rather than a stored pattern.
pub fn is_path_like(name: &str) -> bool {
    name.starts_with('/') || name.starts_with('\\') || name.starts_with('~') || name.starts_with('.')
}

/// Source of pattern records.
///
/// The root accessors are used by structural validation only.
pub trait PatternStore: Send + Sync {
    /// Fetch a pattern by name or path.
    fn get_by_name(&self, name: &str) -> Result<PatternRecord, StoreError>;

    /// Names of all stored patterns, sorted and de-duplicated across roots.
    fn names(&self) -> Result<Vec<String>, StoreError>;

    fn patterns_dir(&self) -> &Path;

    fn custom_patterns_dir(&self) -> Option<&Path>;

    fn system_file_name(&self) -> &str;
}

/// Location of the pattern roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub patterns_dir: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_patterns_dir: Option<PathBuf>,

    #[serde(default = "default_system_file")]
    pub system_file: String,
}

impl StoreConfig {
    pub fn new(patterns_dir: impl Into<PathBuf>) -> Self {
        Self {
            patterns_dir: patterns_dir.into(),
            custom_patterns_dir: None,
            system_file: default_system_file(),
        }
    }

    pub fn with_custom_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.custom_patterns_dir = Some(dir.into());
        self
    }

    pub fn with_system_file(mut self, system_file: impl Into<String>) -> Self {
        self.system_file = system_file.into();
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        let base = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(".config").join("patterns").join("patterns"))
    }
}

/// Reads `<PREFIX>DIR`, `<PREFIX>CUSTOM_DIR` and `<PREFIX>SYSTEM_FILE`.
impl FromEnv for StoreConfig {
    fn from_env(prefix: &str) -> utils::Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = env_string(&format!("{prefix}DIR")) {
            config.patterns_dir = expand_home(&dir);
        }
        if let Some(dir) = env_string(&format!("{prefix}CUSTOM_DIR")) {
            config.custom_patterns_dir = Some(expand_home(&dir));
        }
        if let Some(file) = env_string(&format!("{prefix}SYSTEM_FILE")) {
            config.system_file = file;
        }

        Ok(config)
    }
}

fn default_system_file() -> String {
    DEFAULT_SYSTEM_FILE.to_string()
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}

/// Pattern store backed by directories on disk.
#[derive(Debug, Clone)]
pub struct FsPatternStore {
    config: StoreConfig,
}

impl FsPatternStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn roots(&self) -> impl Iterator<Item = &Path> {
        self.config
            .custom_patterns_dir
            .as_deref()
            .into_iter()
            .chain(std::iter::once(self.config.patterns_dir.as_path()))
    }

    fn system_file_in(&self, root: &Path, name: &str) -> PathBuf {
        root.join(name).join(&self.config.system_file)
    }

    fn read_named(&self, name: &str) -> Result<PatternRecord, StoreError> {
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return Err(StoreError::InvalidName(name.to_string()));
        }

        for root in self.roots() {
            let path = self.system_file_in(root, name);
            if path.is_file() {
                debug!("Loading pattern '{}' from {}", name, path.display());
                let content = std::fs::read_to_string(&path)?;
                return Ok(PatternRecord::new(name, content));
            }
        }

        Err(StoreError::NotFound(name.to_string()))
    }

    fn read_path(&self, name: &str) -> Result<PatternRecord, StoreError> {
        let path = expand_home(name);
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }

        debug!("Loading pattern file {}", path.display());
        let content = std::fs::read_to_string(&path)?;
        Ok(PatternRecord::new(name, content))
    }
}

impl PatternStore for FsPatternStore {
    fn get_by_name(&self, name: &str) -> Result<PatternRecord, StoreError> {
        if is_path_like(name) {
            self.read_path(name)
        } else {
            self.read_named(name)
        }
    }

    fn names(&self) -> Result<Vec<String>, StoreError> {
        let mut names = BTreeSet::new();

        for root in self.roots() {
            if !root.is_dir() {
                continue;
            }

            for entry in std::fs::read_dir(root)? {
                let entry = entry?;
                let path = entry.path();
                if !path.join(&self.config.system_file).is_file() {
                    continue;
                }
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.insert(name.to_string());
                }
            }
        }

        Ok(names.into_iter().collect())
    }

    fn patterns_dir(&self) -> &Path {
        &self.config.patterns_dir
    }

    fn custom_patterns_dir(&self) -> Option<&Path> {
        self.config.custom_patterns_dir.as_deref()
    }

    fn system_file_name(&self) -> &str {
        &self.config.system_file
    }
}
