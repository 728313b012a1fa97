//! Pattern type detection.
//!
//! A type detector classifies pattern content into a type tag used to match
//! handlers. Detectors form an ordered chain in the registry; the first one
//! returning a non-empty tag wins, and [`default_pattern_type`] runs when
//! none match.

use crate::store::PatternRecord;
use std::sync::Arc;

/// Patterns producing output incrementally.
pub const STREAMING: &str = "streaming";
/// Patterns that create or modify files.
pub const FILE_OPERATION: &str = "file_operation";
/// Everything else.
pub const STANDARD: &str = "standard";
/// Alias accepted by the standard handler.
pub const DEFAULT: &str = "default";

/// A classification function. `None` or an empty tag means "no opinion".
pub type TypeDetector = Arc<dyn Fn(&PatternRecord) -> Option<String> + Send + Sync>;

/// Built-in content heuristics.
pub fn default_pattern_type(pattern: &PatternRecord) -> &'static str {
    let content = pattern.content.to_lowercase();

    if content.contains("stream") || content.contains("real-time") {
        return STREAMING;
    }

    if content.contains("create_coding_feature")
        || (content.contains("file") && (content.contains("create") || content.contains("modify")))
    {
        return FILE_OPERATION;
    }

    STANDARD
}

/// Run `detectors` in order, falling back to [`default_pattern_type`].
pub fn detect_with(detectors: &[TypeDetector], pattern: &PatternRecord) -> String {
    detectors
        .iter()
        .filter_map(|detect| detect(pattern))
        .find(|tag| !tag.is_empty())
        .unwrap_or_else(|| default_pattern_type(pattern).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content: &str) -> PatternRecord {
        PatternRecord::new("test", content)
    }

    #[test]
    fn test_default_detector() {
        let cases = [
            ("Stream the answer as it is produced", STREAMING),
            ("Give REAL-TIME commentary", STREAMING),
            ("run create_coding_feature for the request", FILE_OPERATION),
            ("Create a new file with the summary", FILE_OPERATION),
            ("Modify the FILE in place", FILE_OPERATION),
            ("Read the file and summarize", STANDARD),
            ("You are a helpful assistant.", STANDARD),
            ("", STANDARD),
        ];

        for (content, expected) in cases {
            assert_eq!(default_pattern_type(&record(content)), expected, "{content}");
        }
    }

    #[test]
    fn test_streaming_wins_over_file_operation() {
        let pattern = record("Stream progress while you create the file");
        assert_eq!(default_pattern_type(&pattern), STREAMING);
    }

    #[test]
    fn test_chain_first_non_empty_wins() {
        let detectors: Vec<TypeDetector> = vec![
            Arc::new(|_| None),
            Arc::new(|_| Some(String::new())),
            Arc::new(|p| p.content.contains("json").then(|| "structured".to_string())),
            Arc::new(|_| Some("never".to_string())),
        ];

        assert_eq!(detect_with(&detectors, &record("emit json")), "structured");
        assert_eq!(detect_with(&detectors[..2], &record("emit json")), STANDARD);
    }
}
