//! Per-call options passed through to a vendor.

use serde::{Deserialize, Serialize};

/// Options for a single chat call.
///
/// `model` doubles as the vendor selection key: an empty model means "the
/// first configured vendor, with its own default model".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    /// Desired model name.
    #[serde(default)]
    pub model: String,

    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus sampling probability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Upper bound on generated tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatOptions {
    /// Create options requesting a specific model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the nucleus sampling probability.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set the maximum number of generated tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = ChatOptions::new("gpt-4o")
            .with_temperature(0.2)
            .with_top_p(0.9)
            .with_max_tokens(512);

        assert_eq!(options.model, "gpt-4o");
        assert_eq!(options.temperature, Some(0.2));
        assert_eq!(options.top_p, Some(0.9));
        assert_eq!(options.max_tokens, Some(512));
    }

    #[test]
    fn test_options_deserialize_defaults() {
        let options: ChatOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ChatOptions::default());
        assert!(options.model.is_empty());
    }
}
