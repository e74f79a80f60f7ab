//! Island detection and extraction
//!
//! An island is a substring that has to survive machine translation untouched:
//! markup, placeholders, printf-style format specifiers and a leading
//! `Module::method` style prefix. The detector runs an ordered list of pattern
//! passes over the text. Each pass only looks at the text that earlier passes
//! left alone, so a span claimed by an earlier pass is never re-matched.
//!
//! Pass order is part of the contract; changing it changes which class wins
//! when two patterns could claim overlapping text:
//!
//! 1. HTML tags: `<` up to the next `>`
//! 2. Brace placeholders: `{` up to the next `}`
//! 3. Bracket placeholders: `[` up to the next `]`
//! 4. Format specifiers: `%`, then the shortest non-whitespace run ending in a
//!    conversion character
//! 5. Qualified-name prefix at the very start of the text
//!
//! # Example
//!
//! ```ignore
//! let detector = IslandDetector::default();
//! let delimited = detector.detect("<b>Hello</b> %s");
//! assert_eq!(delimited.render(&Delimiters::default()), "⟦<b>⟧Hello⟦</b>⟧ ⟦%s⟧");
//! assert_eq!(extract_islands(&delimited).len(), 3);
//! ```

use std::collections::BTreeSet;

use regex::Regex;

use crate::mt::error::{MtError, MtResult};

/// Conversion characters recognised when no configuration says otherwise
pub const DEFAULT_CONVERSIONS: [char; 4] = ['s', 'd', 'e', 'c'];

/// The pattern classes, in the order the detector applies them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternClass {
    HtmlTag,
    BracePlaceholder,
    BracketPlaceholder,
    FormatSpecifier,
    QualifiedPrefix,
}

impl PatternClass {
    /// Fixed application order of the detector passes
    pub const ORDER: [PatternClass; 5] = [
        PatternClass::HtmlTag,
        PatternClass::BracePlaceholder,
        PatternClass::BracketPlaceholder,
        PatternClass::FormatSpecifier,
        PatternClass::QualifiedPrefix,
    ];
}

/// A non-translatable span, identified by its ordinal position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Island {
    /// 0-based position among all islands, left to right
    pub index: usize,
    /// Original text of the span
    pub text: String,
}

/// A piece of delimited text: either translatable text or an island
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Island(String),
}

/// Opening and closing markers used when delimited text is rendered as a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Delimiters {
            open: "⟦".to_string(),
            close: "⟧".to_string(),
        }
    }
}

/// Text where every island has been wrapped by the detector
///
/// The segments alternate freely between text and islands; two islands may be
/// adjacent, and an island may open or close the text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DelimitedText {
    segments: Vec<Segment>,
}

impl DelimitedText {
    /// Wrap plain text that has no islands yet
    pub fn plain(text: &str) -> Self {
        if text.is_empty() {
            return DelimitedText::default();
        }
        DelimitedText {
            segments: vec![Segment::Text(text.to_string())],
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True iff at least one island was delimited
    pub fn has_islands(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Island(_)))
    }

    /// Render to a string with each island wrapped in `delimiters`
    pub fn render(&self, delimiters: &Delimiters) -> String {
        let mut result = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => result.push_str(text),
                Segment::Island(text) => {
                    result.push_str(&delimiters.open);
                    result.push_str(text);
                    result.push_str(&delimiters.close);
                }
            }
        }
        result
    }

    /// Text with the delimiters dropped, identical to the detector's input
    pub fn to_plain(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) | Segment::Island(text) => text.as_str(),
            })
            .collect()
    }

    /// Parse a rendered string back into segments
    ///
    /// Only first-level pairs are recognised: an island ends at the first
    /// closing marker after its opening marker. An opening marker without a
    /// matching close is kept as plain text.
    pub fn parse(rendered: &str, delimiters: &Delimiters) -> Self {
        let mut delimited = DelimitedText::default();
        let mut rest = rendered;

        while let Some(open_at) = rest.find(&delimiters.open) {
            let after_open = &rest[open_at + delimiters.open.len()..];
            let Some(close_at) = after_open.find(&delimiters.close) else {
                break;
            };
            delimited.push_text(&rest[..open_at]);
            delimited
                .segments
                .push(Segment::Island(after_open[..close_at].to_string()));
            rest = &after_open[close_at + delimiters.close.len()..];
        }
        delimited.push_text(rest);

        delimited
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Text(text.to_string()));
        }
    }
}

/// One detector pass
#[derive(Debug, Clone)]
struct PatternPass {
    class: PatternClass,
    regex: Regex,
    /// Only match at the start of the whole text
    anchored: bool,
}

impl PatternPass {
    fn apply(&self, segments: Vec<Segment>) -> Vec<Segment> {
        let mut out = Vec::with_capacity(segments.len());
        for (position, segment) in segments.into_iter().enumerate() {
            match segment {
                Segment::Text(text) if !self.anchored || position == 0 => {
                    self.split_text(&text, &mut out)
                }
                other => out.push(other),
            }
        }
        out
    }

    fn split_text(&self, text: &str, out: &mut Vec<Segment>) {
        let mut last_end = 0;
        for found in self.regex.find_iter(text) {
            if found.start() > last_end {
                out.push(Segment::Text(text[last_end..found.start()].to_string()));
            }
            out.push(Segment::Island(found.as_str().to_string()));
            last_end = found.end();
        }
        if last_end < text.len() {
            out.push(Segment::Text(text[last_end..].to_string()));
        }
    }
}

/// Finds islands by running the pattern passes in their fixed order
#[derive(Debug, Clone)]
pub struct IslandDetector {
    passes: Vec<PatternPass>,
    conversions: BTreeSet<char>,
}

impl IslandDetector {
    /// Create a detector recognising the given format conversion characters
    ///
    /// # Arguments
    ///
    /// * `conversions` - characters that may end a `%` format specifier
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - the detector
    /// * `Err(MtError::ConfigError)` - if `conversions` is empty or contains whitespace
    pub fn new(conversions: impl IntoIterator<Item = char>) -> MtResult<Self> {
        let conversions: BTreeSet<char> = conversions.into_iter().collect();
        if conversions.is_empty() {
            return Err(MtError::ConfigError(
                "At least one format conversion character is required".to_string(),
            ));
        }
        if let Some(c) = conversions.iter().find(|c| c.is_whitespace()) {
            return Err(MtError::ConfigError(format!(
                "Whitespace cannot be a format conversion character: {:?}",
                c
            )));
        }

        let passes = PatternClass::ORDER
            .iter()
            .map(|&class| Self::build_pass(class, &conversions))
            .collect::<MtResult<Vec<_>>>()?;

        Ok(IslandDetector {
            passes,
            conversions,
        })
    }

    fn build_pass(class: PatternClass, conversions: &BTreeSet<char>) -> MtResult<PatternPass> {
        let pattern = match class {
            PatternClass::HtmlTag => r"<[^>]*>".to_string(),
            PatternClass::BracePlaceholder => r"\{[^}]*\}".to_string(),
            PatternClass::BracketPlaceholder => r"\[[^\]]*\]".to_string(),
            PatternClass::FormatSpecifier => {
                let set: String = conversions
                    .iter()
                    .map(|c| regex::escape(&c.to_string()))
                    .collect();
                format!(r"%\S*?[{}]", set)
            }
            PatternClass::QualifiedPrefix => r"^[^:\s]+::?[^:\s]+".to_string(),
        };

        let regex = Regex::new(&pattern).map_err(|e| {
            MtError::ConfigError(format!("Invalid pattern for {:?}: {}", class, e))
        })?;

        Ok(PatternPass {
            class,
            regex,
            anchored: class == PatternClass::QualifiedPrefix,
        })
    }

    /// Conversion characters this detector accepts
    pub fn conversions(&self) -> &BTreeSet<char> {
        &self.conversions
    }

    /// Delimit every island in `text`
    pub fn detect(&self, text: &str) -> DelimitedText {
        let mut segments = DelimitedText::plain(text).segments;
        for pass in &self.passes {
            segments = pass.apply(segments);
            tracing::trace!(class = ?pass.class, segments = segments.len(), "pattern pass");
        }
        DelimitedText { segments }
    }
}

impl Default for IslandDetector {
    fn default() -> Self {
        IslandDetector::new(DEFAULT_CONVERSIONS).expect("built-in island patterns should compile")
    }
}

/// Ordered island contents of delimited text, delimiters stripped
pub fn extract_islands(delimited: &DelimitedText) -> Vec<Island> {
    delimited
        .segments
        .iter()
        .filter_map(|segment| match segment {
            Segment::Island(text) => Some(text.clone()),
            Segment::Text(_) => None,
        })
        .enumerate()
        .map(|(index, text)| Island { index, text })
        .collect()
}
