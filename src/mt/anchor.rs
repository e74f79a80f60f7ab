//! Numbered anchor tokens for order-independent island restoration
//!
//! Instead of one shared marker, each island is replaced by its own token
//! before translation. Restoration looks tokens up by number, so a translation
//! that moves islands around (common when the target language changes word
//! order) still gets every island back in the right place. A token that the
//! translation service dropped is reported as an error.
//!
//! Format: _ID{tag}{index}_ where index is the island's 1-based position and
//! tag is empty unless the text itself already contains such tokens, in which
//! case the first letter tag (A, B, ..., Z, AA, ...) that cannot be confused
//! with the text is used.
//! Examples: _ID1_, _ID2_, _IDA1_, etc.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::mt::error::{MtError, MtResult};
use crate::mt::islands::{DelimitedText, Island};
use crate::mt::masking::{MAX_MARKER_ATTEMPTS, MaskedText, place_tokens};

/// Start of every anchor token; the letter tag and the number follow
pub const ANCHOR_PREFIX: &str = "_ID";

static TOKEN_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)_").expect("anchor token regex should compile"));

/// A unique, non-translatable string standing in for one island
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorToken {
    /// 1-based island position (island index + 1)
    pub position: usize,
    /// The token string
    pub token: String,
}

impl AnchorToken {
    pub fn new(position: usize) -> Self {
        AnchorToken::tagged(ANCHOR_PREFIX, position)
    }

    /// Token built on `prefix`, which is [`ANCHOR_PREFIX`] plus a letter tag
    pub fn tagged(prefix: &str, position: usize) -> Self {
        AnchorToken {
            position,
            token: format!("{}{}_", prefix, position),
        }
    }

    /// Token for the island with the given 0-based index
    pub fn for_island(index: usize) -> Self {
        AnchorToken::new(index + 1)
    }
}

/// Generate anchor tokens for a given count
///
/// # Example
/// ```ignore
/// let tokens = generate_anchor_tokens(3);
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[0].token, "_ID1_");
/// ```
pub fn generate_anchor_tokens(count: usize) -> Vec<AnchorToken> {
    (1..=count).map(AnchorToken::new).collect()
}

/// Letter tag for the given attempt: "", "A", ..., "Z", "AA", "AB", ...
fn anchor_tag(attempt: usize) -> String {
    let mut tag = Vec::new();
    let mut n = attempt;
    while n > 0 {
        n -= 1;
        tag.push(char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }
    tag.into_iter().rev().collect()
}

/// An anchor token located in some text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FoundToken {
    start: usize,
    end: usize,
    position: usize,
}

/// Tokens built on `prefix` in `text`, left to right and non-overlapping
fn tokens_in(text: &str, prefix: &str) -> Vec<FoundToken> {
    let mut tokens = Vec::new();
    let mut free_from = 0;

    for (start, _) in text.match_indices(prefix) {
        if start < free_from {
            continue;
        }
        let tail_start = start + prefix.len();
        let Some(caps) = TOKEN_TAIL.captures(&text[tail_start..]) else {
            continue;
        };
        let Ok(position) = caps[1].parse::<usize>() else {
            continue;
        };
        let end = tail_start + caps[0].len();
        tokens.push(FoundToken {
            start,
            end,
            position,
        });
        free_from = end;
    }

    tokens
}

/// Replace every island with its own anchor token and escape single quotes
///
/// The token prefix is chosen so that the only tokens in the masked text are
/// the ones standing for islands. The prefix in use is returned as
/// [`MaskedText::marker`].
///
/// # Example
/// ```ignore
/// let delimited = IslandDetector::default().detect("$1 sent {count}");
/// let masked = mask_with_anchors(&delimited)?;
/// assert_eq!(masked.text, "$1 sent _ID1_");
///
/// let delimited = IslandDetector::default().detect("Use _ID1_ or {x}");
/// let masked = mask_with_anchors(&delimited)?;
/// assert_eq!(masked.text, "Use _ID1_ or _IDA1_");
/// ```
pub fn mask_with_anchors(delimited: &DelimitedText) -> MtResult<MaskedText> {
    for attempt in 0..MAX_MARKER_ATTEMPTS {
        let prefix = format!("{}{}", ANCHOR_PREFIX, anchor_tag(attempt));
        let placed = place_tokens(delimited, |index| {
            AnchorToken::tagged(&prefix, index + 1).token
        });

        let found = tokens_in(&placed.text, &prefix)
            .into_iter()
            .map(|token| (token.start, &placed.text[token.start..token.end]));
        let expected = placed
            .tokens
            .iter()
            .map(|(offset, token)| (*offset, token.as_str()));
        if found.eq(expected) {
            return Ok(placed.into_masked(prefix));
        }
        debug!(prefix = %prefix, "anchor tokens collide with the text, trying another tag");
    }

    Err(MtError::MarkerMismatch(format!(
        "no anchor token prefix out of {} keeps the text apart from its islands",
        MAX_MARKER_ATTEMPTS
    )))
}

/// Replace anchor tokens in translated text with the islands they stand for
///
/// `prefix` is the token prefix masking used ([`MaskedText::marker`]). Tokens
/// may appear in any order and more than once. Tokens with another prefix or
/// whose number does not belong to any island are left alone.
///
/// # Returns
/// * `Ok(String)` - Text with islands restored
/// * `Err(MtError::MarkerMismatch)` - If the translation lost one or more tokens
///
/// # Example
/// ```ignore
/// let translated = "_ID2_ は _ID1_ によって送信";
/// let restored = restore_from_anchors(translated, &islands, ANCHOR_PREFIX)?;
/// ```
pub fn restore_from_anchors(text: &str, islands: &[Island], prefix: &str) -> MtResult<String> {
    let tokens = tokens_in(text, prefix);
    let found: BTreeSet<usize> = tokens.iter().map(|token| token.position).collect();

    let missing: Vec<String> = (1..=islands.len())
        .filter(|position| !found.contains(position))
        .map(|position| AnchorToken::tagged(prefix, position).token)
        .collect();

    if !missing.is_empty() {
        return Err(MtError::MarkerMismatch(format!(
            "translation is missing anchor tokens {:?}",
            missing
        )));
    }

    let mut restored = String::with_capacity(text.len());
    let mut copied = 0;
    for token in &tokens {
        let Some(island) = token.position.checked_sub(1).and_then(|i| islands.get(i)) else {
            continue;
        };
        restored.push_str(&text[copied..token.start]);
        restored.push_str(&island.text);
        copied = token.end;
    }
    restored.push_str(&text[copied..]);

    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mt::islands::{IslandDetector, extract_islands};

    fn islands_of(text: &str) -> Vec<Island> {
        extract_islands(&IslandDetector::default().detect(text))
    }

    #[test]
    fn test_anchor_token_creation() {
        let token = AnchorToken::new(1);
        assert_eq!(token.position, 1);
        assert_eq!(token.token, "_ID1_");
        assert_eq!(AnchorToken::for_island(41).token, "_ID42_");
    }

    #[test]
    fn test_generate_anchor_tokens_uniqueness() {
        let tokens = generate_anchor_tokens(10);
        let tokens_set: std::collections::HashSet<_> = tokens.iter().map(|t| &t.token).collect();
        assert_eq!(tokens_set.len(), 10, "All tokens should be unique");
    }

    #[test]
    fn test_generate_anchor_tokens_zero() {
        assert!(generate_anchor_tokens(0).is_empty());
    }

    #[test]
    fn test_mask_with_anchors() {
        let delimited = IslandDetector::default().detect("<b>%s</b> isn't {x}");
        let masked = mask_with_anchors(&delimited).unwrap();
        assert_eq!(masked.text, r"_ID1__ID2__ID3_ isn\'t _ID4_");
        assert_eq!(masked.marker, ANCHOR_PREFIX);
        assert!(masked.has_islands);
    }

    #[test]
    fn test_restore_in_order() {
        let islands = islands_of("%s sent %d");
        let restored = restore_from_anchors("_ID1_ a envoyé _ID2_", &islands, ANCHOR_PREFIX).unwrap();
        assert_eq!(restored, "%s a envoyé %d");
    }

    #[test]
    fn test_restore_after_reordering_japanese() {
        let islands = islands_of("%s sent %d");
        let restored = restore_from_anchors("_ID2_ は _ID1_ によって送信", &islands, ANCHOR_PREFIX).unwrap();
        assert_eq!(restored, "%d は %s によって送信");
    }

    #[test]
    fn test_restore_adjacent_tokens() {
        let islands = islands_of("<i>{x}</i>");
        let restored = restore_from_anchors("_ID1__ID2__ID3_", &islands, ANCHOR_PREFIX).unwrap();
        assert_eq!(restored, "<i>{x}</i>");
    }

    #[test]
    fn test_restore_double_digit_positions() {
        let text = (0..11).map(|i| format!("{{p{}}}", i)).collect::<Vec<_>>().join(" ");
        let islands = islands_of(&text);
        assert_eq!(islands.len(), 11);
        let translated = "_ID11_ _ID1_ _ID10_ _ID2_ _ID3_ _ID4_ _ID5_ _ID6_ _ID7_ _ID8_ _ID9_";
        let restored = restore_from_anchors(translated, &islands, ANCHOR_PREFIX).unwrap();
        assert!(restored.starts_with("{p10} {p0} {p9} {p1}"));
    }

    #[test]
    fn test_restore_duplicated_token() {
        let islands = islands_of("Hi %s");
        let restored = restore_from_anchors("_ID1_, _ID1_!", &islands, ANCHOR_PREFIX).unwrap();
        assert_eq!(restored, "%s, %s!");
    }

    #[test]
    fn test_missing_token_is_error() {
        let islands = islands_of("{a} and {b}");
        let result = restore_from_anchors("_ID1_ et", &islands, ANCHOR_PREFIX);
        match result {
            Err(MtError::MarkerMismatch(msg)) => assert!(msg.contains("_ID2_")),
            other => panic!("Expected MarkerMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_token_is_left_alone() {
        let islands = islands_of("Hi %s");
        let restored = restore_from_anchors("_ID1_ _ID7_ _ID0_", &islands, ANCHOR_PREFIX).unwrap();
        assert_eq!(restored, "%s _ID7_ _ID0_");
    }

    #[test]
    fn test_no_islands_no_tokens() {
        let restored = restore_from_anchors("Bonjour", &[], ANCHOR_PREFIX).unwrap();
        assert_eq!(restored, "Bonjour");
    }

    #[test]
    fn test_anchor_tags() {
        assert_eq!(anchor_tag(0), "");
        assert_eq!(anchor_tag(1), "A");
        assert_eq!(anchor_tag(26), "Z");
        assert_eq!(anchor_tag(27), "AA");
        assert_eq!(anchor_tag(28), "AB");
    }

    #[test]
    fn test_literal_token_in_text_switches_tag() {
        let delimited = IslandDetector::default().detect("Use _ID1_ or {x}");
        let masked = mask_with_anchors(&delimited).unwrap();
        assert_eq!(masked.text, "Use _ID1_ or _IDA1_");
        assert_eq!(masked.marker, "_IDA");

        let islands = extract_islands(&delimited);
        let restored = restore_from_anchors(&masked.text, &islands, &masked.marker).unwrap();
        assert_eq!(restored, "Use _ID1_ or {x}");
    }

    #[test]
    fn test_text_joining_into_token_switches_tag() {
        // "VAR_ID1" followed by "_ID1_" reads "_ID1_" one character early
        let delimited = IslandDetector::default().detect("VAR_ID1%s");
        let masked = mask_with_anchors(&delimited).unwrap();
        let islands = extract_islands(&delimited);
        let restored = restore_from_anchors(&masked.text, &islands, &masked.marker).unwrap();
        assert_eq!(restored, "VAR_ID1%s");
    }

    #[test]
    fn test_every_tag_taken_is_error() {
        let mut text: String = (0..MAX_MARKER_ATTEMPTS)
            .map(|attempt| format!("_ID{}1_ ", anchor_tag(attempt)))
            .collect();
        text.push_str("%s");
        let delimited = IslandDetector::default().detect(&text);
        assert!(matches!(
            mask_with_anchors(&delimited),
            Err(MtError::MarkerMismatch(_))
        ));
    }

    #[test]
    fn test_restore_ignores_other_tags() {
        let islands = islands_of("Hi %s");
        let restored = restore_from_anchors("_ID1_ _IDA1_", &islands, "_IDA").unwrap();
        assert_eq!(restored, "_ID1_ %s");
    }
}
