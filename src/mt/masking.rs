//! Masking islands before translation and restoring them afterwards
//!
//! Masking replaces each island with a marker token the translation service
//! passes through untouched. Restoration walks the translated text and puts the
//! islands back.
//!
//! With [`MarkerStrategy::Shared`] every island gets the same marker and the
//! Nth marker in the translation is filled with the Nth island. This is blind
//! to reordering: if the translation swaps two markers their islands swap too,
//! and a marker dropped by the service drops the trailing island. Both are
//! tolerated and logged, never reported as errors.
//!
//! [`MarkerStrategy::Numbered`] gives each island its own token (see
//! [`crate::mt::anchor`]) so restoration does not depend on order, and a lost
//! token is an error.
//!
//! Either way, the marker written into the masked text is checked against the
//! text around it. If the text already contains the marker, or runs into one
//! (`USER_ID` followed by `_ID_`), a derived marker is used instead, so the
//! masked text holds markers exactly where the islands were.

use tracing::{debug, warn};

use crate::mt::anchor;
use crate::mt::error::{MtError, MtResult};
use crate::mt::islands::{DelimitedText, Island, Segment};

/// Shared marker used when no configuration says otherwise
pub const DEFAULT_MARKER: &str = "_ID_";

/// How many markers masking tries before giving up on a text
pub const MAX_MARKER_ATTEMPTS: usize = 1000;

/// Text ready to be sent to the translation service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedText {
    /// Text with islands replaced by markers and single quotes escaped
    pub text: String,
    /// Whether any island was replaced; restoration is skipped otherwise
    pub has_islands: bool,
    /// Marker written into `text`, or the token prefix for numbered tokens.
    /// Differs from the configured one when the text itself contains it.
    pub marker: String,
}

/// How islands are represented in the text sent for translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerStrategy {
    /// One marker for all islands, restored by ordinal position
    Shared(String),
    /// `_ID1_`, `_ID2_`, ... restored by number
    Numbered,
}

impl Default for MarkerStrategy {
    fn default() -> Self {
        MarkerStrategy::Shared(DEFAULT_MARKER.to_string())
    }
}

impl MarkerStrategy {
    pub fn mask(&self, delimited: &DelimitedText) -> MtResult<MaskedText> {
        match self {
            MarkerStrategy::Shared(marker) => mask(delimited, marker),
            MarkerStrategy::Numbered => anchor::mask_with_anchors(delimited),
        }
    }

    /// Undo quote escaping and put the islands back into `translated`
    ///
    /// `masked` is what [`MarkerStrategy::mask`] produced for the same text.
    /// Quotes are unescaped even when there are no islands, since masking
    /// escaped them regardless.
    pub fn restore(
        &self,
        translated: &str,
        islands: &[Island],
        masked: &MaskedText,
    ) -> MtResult<String> {
        let translated = unescape_quotes(translated);
        match self {
            MarkerStrategy::Shared(_) => Ok(restore(
                &translated,
                &masked.marker,
                islands,
                masked.has_islands,
            )),
            MarkerStrategy::Numbered => {
                if !masked.has_islands {
                    return Ok(translated);
                }
                anchor::restore_from_anchors(&translated, islands, &masked.marker)
            }
        }
    }
}

/// Replace every island with `marker` and escape single quotes
///
/// When the text around the islands already contains `marker`, or would form
/// one when joined with a marker, `marker{n}marker` for the first `n` that
/// does not is used instead. The marker in use is returned as
/// [`MaskedText::marker`].
///
/// # Example
///
/// ```ignore
/// let delimited = IslandDetector::default().detect("It's %s");
/// let masked = mask(&delimited, "_ID_")?;
/// assert_eq!(masked.text, r"It\'s _ID_");
/// assert!(masked.has_islands);
///
/// let masked = mask(&IslandDetector::default().detect("USER_ID%s"), "_ID_")?;
/// assert_eq!(masked.text, "USER_ID_ID_1_ID_");
/// ```
pub fn mask(delimited: &DelimitedText, marker: &str) -> MtResult<MaskedText> {
    if marker.is_empty() {
        return Err(MtError::ConfigError("marker must not be empty".to_string()));
    }
    if !delimited.has_islands() {
        return Ok(place_tokens(delimited, |_| String::new()).into_masked(marker.to_string()));
    }

    for attempt in 0..MAX_MARKER_ATTEMPTS {
        let candidate = if attempt == 0 {
            marker.to_string()
        } else {
            format!("{}{}{}", marker, attempt, marker)
        };
        let placed = place_tokens(delimited, |_| candidate.clone());

        let found = placed
            .text
            .match_indices(candidate.as_str())
            .map(|(offset, _)| offset);
        if found.eq(placed.tokens.iter().map(|(offset, _)| *offset)) {
            return Ok(placed.into_masked(candidate));
        }
        debug!(marker = %candidate, "marker collides with the text, trying another");
    }

    Err(MtError::MarkerMismatch(format!(
        "no marker derived from {:?} keeps the text apart from its islands",
        marker
    )))
}

/// Masked text together with where each island token was written
pub(crate) struct PlacedTokens {
    pub(crate) text: String,
    /// Byte offset and token of every island, left to right
    pub(crate) tokens: Vec<(usize, String)>,
}

impl PlacedTokens {
    pub(crate) fn into_masked(self, marker: String) -> MaskedText {
        MaskedText {
            has_islands: !self.tokens.is_empty(),
            text: self.text,
            marker,
        }
    }
}

/// Shared masking loop; `token_for` receives the island's ordinal index
pub(crate) fn place_tokens<F>(delimited: &DelimitedText, mut token_for: F) -> PlacedTokens
where
    F: FnMut(usize) -> String,
{
    let mut text = String::new();
    let mut tokens = Vec::new();

    for segment in delimited.segments() {
        match segment {
            Segment::Text(plain) => text.push_str(&escape_quotes(plain)),
            Segment::Island(_) => {
                let token = token_for(tokens.len());
                let offset = text.len();
                text.push_str(&token);
                tokens.push((offset, token));
            }
        }
    }

    PlacedTokens { text, tokens }
}

/// Fill marker occurrences in `translated` with the islands, in order
///
/// The Nth occurrence of `marker` receives the Nth island. Islands without a
/// marker are dropped; markers without an island stay in the output.
pub fn restore(translated: &str, marker: &str, islands: &[Island], has_islands: bool) -> String {
    if !has_islands || marker.is_empty() {
        return translated.to_string();
    }

    let mut result = String::with_capacity(translated.len());
    let mut rest = translated;
    let mut pending = islands.iter();
    let mut restored = 0;

    while let Some(position) = rest.find(marker) {
        let Some(island) = pending.next() else {
            break;
        };
        result.push_str(&rest[..position]);
        result.push_str(&island.text);
        rest = &rest[position + marker.len()..];
        restored += 1;
    }
    result.push_str(rest);

    if restored < islands.len() {
        warn!(
            expected = islands.len(),
            found = restored,
            "translation lost markers; trailing islands dropped"
        );
    } else if rest.contains(marker) {
        debug!(
            surplus = rest.matches(marker).count(),
            "translation has more markers than islands"
        );
    }

    result
}

/// Escape single quotes so they cannot close a quoted field downstream
pub fn escape_quotes(text: &str) -> String {
    text.replace('\'', r"\'")
}

/// Inverse of [`escape_quotes`]
pub fn unescape_quotes(text: &str) -> String {
    text.replace(r"\'", "'")
}
