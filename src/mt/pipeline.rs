//! Translate one query while keeping its islands intact
//!
//! detect → extract → mask → translate → restore

use tracing::debug;

use crate::mt::error::MtResult;
use crate::mt::islands::{Delimiters, IslandDetector, extract_islands};
use crate::mt::masking::MarkerStrategy;
use crate::mt::translator::MachineTranslator;

/// Text to translate and the language pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub source: String,
    pub target: String,
}

impl Query {
    pub fn new(
        text: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Query {
            text: text.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    detector: IslandDetector,
    strategy: MarkerStrategy,
}

impl Pipeline {
    pub fn new(detector: IslandDetector, strategy: MarkerStrategy) -> Self {
        Pipeline { detector, strategy }
    }

    pub fn strategy(&self) -> &MarkerStrategy {
        &self.strategy
    }

    /// Run the query through `translator`
    ///
    /// Errors from the translator are returned unchanged. With the shared
    /// marker strategy a translation that lost markers is not an error.
    pub async fn run(&self, translator: &dyn MachineTranslator, query: &Query) -> MtResult<String> {
        let delimited = self.detector.detect(&query.text);
        let islands = extract_islands(&delimited);
        debug!(
            delimited = %delimited.render(&Delimiters::default()),
            islands = islands.len(),
            "detected islands"
        );

        let masked = self.strategy.mask(&delimited)?;
        debug!(
            masked = %masked.text,
            marker = %masked.marker,
            has_islands = masked.has_islands,
            "masked query"
        );

        let translated = translator
            .translate(&masked.text, &query.source, &query.target)
            .await?;
        debug!(
            provider = translator.provider_name(),
            translated = %translated,
            "translation received"
        );

        let restored = self.strategy.restore(&translated, &islands, &masked)?;
        debug!(restored = %restored, "islands restored");

        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mt::error::MtError;
    use crate::mt::mock::{MockMode, MockTranslator};
    use std::collections::HashMap;

    async fn run_with(mode: MockMode, strategy: MarkerStrategy, text: &str) -> MtResult<String> {
        let pipeline = Pipeline::new(IslandDetector::default(), strategy);
        let translator = MockTranslator::new(mode);
        pipeline.run(&translator, &Query::new(text, "en", "fr")).await
    }

    #[tokio::test]
    async fn test_identity_translation_round_trips() {
        let inputs = [
            "Hello %s, welcome",
            "<b>bold</b> text",
            "Cache::evict: {count} entries [%d bytes] aren't freed",
            "no islands here",
        ];
        for input in inputs {
            let shared = run_with(MockMode::NoOp, MarkerStrategy::default(), input).await;
            assert_eq!(shared.unwrap(), input);
            let numbered = run_with(MockMode::NoOp, MarkerStrategy::Numbered, input).await;
            assert_eq!(numbered.unwrap(), input);
        }
    }

    #[tokio::test]
    async fn test_text_resembling_markers_round_trips() {
        for input in ["USER_ID%s", "Set _ID_ to %s", "Use _ID1_ or {x}"] {
            let shared = run_with(MockMode::NoOp, MarkerStrategy::default(), input).await;
            assert_eq!(shared.unwrap(), input);
            let numbered = run_with(MockMode::NoOp, MarkerStrategy::Numbered, input).await;
            assert_eq!(numbered.unwrap(), input);
        }
    }

    #[tokio::test]
    async fn test_translation_keeps_islands() {
        let mut map = HashMap::new();
        map.insert(
            ("Hello _ID_, welcome".to_string(), "fr".to_string()),
            "Bonjour _ID_, bienvenue".to_string(),
        );
        let result = run_with(
            MockMode::Mappings(map),
            MarkerStrategy::default(),
            "Hello %s, welcome",
        )
        .await
        .unwrap();
        assert_eq!(result, "Bonjour %s, bienvenue");
    }

    #[tokio::test]
    async fn test_translator_sees_escaped_quotes() {
        let mut map = HashMap::new();
        map.insert(
            (r"It\'s _ID_".to_string(), "fr".to_string()),
            r"C\'est _ID_".to_string(),
        );
        let result = run_with(MockMode::Mappings(map), MarkerStrategy::default(), "It's %s")
            .await
            .unwrap();
        assert_eq!(result, "C'est %s");
    }

    #[tokio::test]
    async fn test_lost_markers_are_tolerated_with_shared_strategy() {
        let mode = MockMode::DropMarkers {
            marker: "_ID_".to_string(),
            keep: 1,
        };
        let result = run_with(mode, MarkerStrategy::default(), "{a} then {b}")
            .await
            .unwrap();
        assert_eq!(result, "{a} then ");
    }

    #[tokio::test]
    async fn test_lost_markers_are_errors_with_numbered_strategy() {
        let mode = MockMode::DropMarkers {
            marker: "_ID2_".to_string(),
            keep: 0,
        };
        let result = run_with(mode, MarkerStrategy::Numbered, "{a} then {b}").await;
        assert!(matches!(result, Err(MtError::MarkerMismatch(_))));
    }

    #[tokio::test]
    async fn test_reordering_with_numbered_strategy() {
        let result = run_with(MockMode::Reorder, MarkerStrategy::Numbered, "%s sent %d")
            .await
            .unwrap();
        assert_eq!(result, "%d sent %s");
    }

    #[tokio::test]
    async fn test_reordering_with_shared_strategy_restores_by_position() {
        // Shared markers are restored by position, so reordering is not undone
        let result = run_with(MockMode::Reorder, MarkerStrategy::default(), "%s sent %d")
            .await
            .unwrap();
        assert_eq!(result, "%s sent %d");
    }

    #[tokio::test]
    async fn test_translator_error_is_returned() {
        let result = run_with(
            MockMode::Error("quota exceeded".to_string()),
            MarkerStrategy::default(),
            "Hello",
        )
        .await;
        assert!(matches!(result, Err(MtError::RemoteError { code: 503, .. })));
    }

    #[tokio::test]
    async fn test_no_islands_returns_translation_verbatim() {
        let result = run_with(MockMode::Suffix, MarkerStrategy::default(), "Hello")
            .await
            .unwrap();
        assert_eq!(result, "Hello_fr");
    }
}
