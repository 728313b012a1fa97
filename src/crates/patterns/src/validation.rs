//! Validation engine.
//!
//! Two tiers of pure checks, each returning the first finding:
//!
//! - [`validate_base`]: presence of the record, name and content, and the
//!   configured length limit.
//! - [`validate_structure`] and [`validate_content`]: the standard tier,
//!   checking the on-disk layout of named patterns and the shape of the
//!   content.
//!
//! Whether validation runs at all is the handler's decision.

use crate::error::ValidationError;
use crate::store::{is_path_like, PatternRecord, PatternStore};

/// Base tier checks.
pub fn validate_base(
    pattern: Option<&PatternRecord>,
    max_context_length: usize,
) -> Result<(), ValidationError> {
    let Some(pattern) = pattern else {
        return Err(ValidationError::critical(
            "unknown",
            "pattern",
            "pattern cannot be nil",
        ));
    };

    if pattern.name.is_empty() {
        return Err(ValidationError::error(
            &pattern.name,
            "name",
            "pattern name cannot be empty",
        ));
    }

    if pattern.content.is_empty() {
        return Err(ValidationError::error(
            &pattern.name,
            "pattern",
            "pattern content cannot be empty",
        ));
    }

    if max_context_length > 0 && pattern.content.chars().count() > max_context_length {
        return Err(ValidationError::error(
            &pattern.name,
            "pattern",
            format!(
                "pattern content exceeds maximum length of {} characters",
                max_context_length
            ),
        ));
    }

    Ok(())
}

/// Standard tier: named patterns must exist on disk.
///
/// Path-like names are not checked. A named pattern needs its system file in
/// the primary or the custom root; when both have one, the custom copy is
/// the one that must be readable.
pub fn validate_structure(name: &str, store: &dyn PatternStore) -> Result<(), ValidationError> {
    if is_path_like(name) {
        return Ok(());
    }

    let system_file_name = store.system_file_name();
    let main_file = store.patterns_dir().join(name).join(system_file_name);
    let custom_file = store
        .custom_patterns_dir()
        .map(|root| root.join(name).join(system_file_name))
        .filter(|file| file.is_file());

    let resolved = match custom_file {
        Some(file) => file,
        None if main_file.is_file() => main_file,
        None => {
            return Err(ValidationError::error(
                name,
                "directory",
                format!("pattern directory not found: {}", name),
            ));
        }
    };

    if let Err(e) = std::fs::File::open(&resolved) {
        return Err(ValidationError::error(
            name,
            "system_file",
            format!(
                "{} file not found or not readable: {} ({})",
                system_file_name,
                resolved.display(),
                e
            ),
        ));
    }

    Ok(())
}

/// Standard tier: content shape.
pub fn validate_content(pattern: &PatternRecord) -> Result<(), ValidationError> {
    let content = pattern.content.trim();

    if content.is_empty() {
        return Err(ValidationError::error(
            &pattern.name,
            "content",
            "pattern content is empty",
        ));
    }

    if content.contains("{{") && !content.contains("}}") {
        return Err(ValidationError::warning(
            &pattern.name,
            "content",
            "unclosed template variable found",
        ));
    }

    for (idx, line) in content.lines().enumerate() {
        if is_malformed_header(line) {
            return Err(ValidationError::warning(
                &pattern.name,
                "content",
                format!("malformed markdown header at line {}: {}", idx + 1, line),
            ));
        }
    }

    Ok(())
}

/// A line starting with `#` that is not 1-6 `#` followed by a space.
pub fn is_malformed_header(line: &str) -> bool {
    if !line.starts_with('#') {
        return false;
    }

    let level = line.bytes().take_while(|&b| b == b'#').count();
    !(level <= 6 && line.as_bytes().get(level) == Some(&b' '))
}
