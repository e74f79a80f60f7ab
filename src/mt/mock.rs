//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, API-free translator for testing
//! the masking pipeline without credentials or network access. The CLI's
//! `--dry-run` uses the `NoOp` mode to show what the service would receive.
//!
//! # Example
//!
//! ```ignore
//! use gtrans::mt::{MachineTranslator, MockTranslator, MockMode};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", "en", "fr").await.unwrap();
//!     assert_eq!(result, "hello_fr");
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::HashMap;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_fr"
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (text, target_locale) → translation
    Mappings(HashMap<(String, String), String>),

    /// Reverse the order of whitespace-separated words, like a target
    /// language with a different word order would
    Reorder,

    /// Keep only the first `keep` occurrences of `marker`, like a service
    /// that swallows placeholders
    DropMarkers { marker: String, keep: usize },

    /// Fail like the remote service would, with the given message
    Error(String),

    /// No-op: return input unchanged
    NoOp,
}

/// Mock translator that simulates various translation scenarios
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self { mode }
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, text: &str, target: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Reorder => {
                let words: Vec<&str> = text.split_whitespace().collect();
                Ok(words.into_iter().rev().collect::<Vec<_>>().join(" "))
            }
            MockMode::DropMarkers { marker, keep } => Ok(drop_markers(text, marker, *keep)),
            MockMode::Error(msg) => Err(MtError::RemoteError {
                code: 503,
                message: msg.clone(),
            }),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

fn drop_markers(text: &str, marker: &str, keep: usize) -> String {
    if marker.is_empty() {
        return text.to_string();
    }
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    let mut seen = 0;
    while let Some(position) = rest.find(marker) {
        result.push_str(&rest[..position]);
        if seen < keep {
            result.push_str(marker);
        }
        seen += 1;
        rest = &rest[position + marker.len()..];
    }
    result.push_str(rest);
    result
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        self.apply_translation(text, target_locale)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_suffix_single_translation() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let result = mock.translate("hello", "en", "fr").await.unwrap();
        assert_eq!(result, "hello_fr");
    }

    #[tokio::test]
    async fn test_suffix_preserves_markers() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let result = mock.translate("_ID_ sent _ID_", "en", "fr").await.unwrap();
        assert_eq!(result, "_ID_ sent _ID__fr");
    }

    #[tokio::test]
    async fn test_mapping_single_translation() {
        let mut map = HashMap::new();
        map.insert(
            ("hello".to_string(), "fr".to_string()),
            "bonjour".to_string(),
        );

        let mock = MockTranslator::new(MockMode::Mappings(map));
        assert_eq!(mock.translate("hello", "en", "fr").await.unwrap(), "bonjour");
        // Unknown mapping falls back to suffix mode
        assert_eq!(mock.translate("bye", "en", "fr").await.unwrap(), "bye_fr");
    }

    #[tokio::test]
    async fn test_reorder_reverses_words() {
        let mock = MockTranslator::new(MockMode::Reorder);
        let result = mock.translate("_ID1_ sent _ID2_", "en", "ja").await.unwrap();
        assert_eq!(result, "_ID2_ sent _ID1_");
    }

    #[tokio::test]
    async fn test_drop_markers() {
        let mock = MockTranslator::new(MockMode::DropMarkers {
            marker: "_ID_".to_string(),
            keep: 1,
        });
        let result = mock.translate("a _ID_ b _ID_ c _ID_", "en", "fr").await.unwrap();
        assert_eq!(result, "a _ID_ b  c ");
    }

    #[tokio::test]
    async fn test_error_mode_returns_remote_error() {
        let mock = MockTranslator::new(MockMode::Error("API unavailable".to_string()));
        match mock.translate("hello", "en", "fr").await {
            Err(MtError::RemoteError { code, message }) => {
                assert_eq!(code, 503);
                assert_eq!(message, "API unavailable");
            }
            other => panic!("Expected RemoteError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_noop_returns_unchanged() {
        let mock = MockTranslator::new(MockMode::NoOp);
        let text = r"It\'s _ID_";
        assert_eq!(mock.translate(text, "en", "fr").await.unwrap(), text);
    }

    #[test]
    fn test_provider_name() {
        let mock = MockTranslator::new(MockMode::Suffix);
        assert_eq!(mock.provider_name(), "Mock Translator");
    }
}
