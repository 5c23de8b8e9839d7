//! `[LEARN]` annotation parsing
//!
//! Grammar, applied at every occurrence of the tag:
//!
//! ```text
//! annotation := "[LEARN]" ws* category ":" ws* rule EOL
//! category   := word (word | "-")*
//! rule       := non-empty text up to end of line
//! field      := ("Mistake" | "Correction") ":" ws* text EOL
//! ```
//!
//! `ws` is horizontal whitespace only, so a tag whose rule is on the next line
//! does not match. Fields are optional and are looked up in a bounded window
//! after the annotation line; the window ends early at the next tag so fields
//! are never borrowed from a neighbouring annotation.
//!
//! Repeated annotations are all returned. Deduplication is the learning
//! store's job.

use serde::{Deserialize, Serialize};

pub const LEARN_TAG: &str = "[LEARN]";
const MISTAKE_LABEL: &str = "Mistake:";
const CORRECTION_LABEL: &str = "Correction:";

/// One parsed annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub category: String,
    pub rule: String,
    pub mistake: Option<String>,
    pub correction: Option<String>,
}

/// Scans agent output for annotations
#[derive(Debug, Clone)]
pub struct AnnotationParser {
    /// Characters after the annotation line searched for sub-fields
    lookahead: usize,
}

impl Default for AnnotationParser {
    fn default() -> Self {
        Self::new(200)
    }
}

impl AnnotationParser {
    pub fn new(lookahead: usize) -> Self {
        Self { lookahead }
    }

    /// Parse every well-formed annotation in `text`, in order of appearance
    pub fn parse(&self, text: &str) -> Vec<Annotation> {
        let tag_positions: Vec<usize> = text.match_indices(LEARN_TAG).map(|(i, _)| i).collect();

        let mut annotations = Vec::new();
        for (n, &start) in tag_positions.iter().enumerate() {
            let body_start = start + LEARN_TAG.len();
            let Some((category, rule, line_end)) = parse_head(&text[body_start..]) else {
                continue;
            };

            let window_start = body_start + line_end;
            let next_tag = tag_positions.get(n + 1).copied().unwrap_or(text.len());
            let window_end = advance_chars(text, window_start, self.lookahead).min(next_tag);
            let window = if window_start < window_end {
                &text[window_start..window_end]
            } else {
                ""
            };

            annotations.push(Annotation {
                category,
                rule,
                mistake: find_field(text, window_start, window, MISTAKE_LABEL),
                correction: find_field(text, window_start, window, CORRECTION_LABEL),
            });
        }

        annotations
    }
}

/// Parse `ws* category ":" ws* rule` from the text right after a tag.
///
/// Returns the category, the trimmed rule and the byte offset of the end of
/// the annotation line.
fn parse_head(input: &str) -> Option<(String, String, usize)> {
    let after_ws = input.trim_start_matches(is_horizontal_ws);
    let offset = input.len() - after_ws.len();

    let mut chars = after_ws.char_indices();
    let (_, first) = chars.next()?;
    if !is_word_char(first) {
        return None;
    }
    let category_end = chars
        .find(|&(_, c)| !(is_word_char(c) || c == '-'))
        .map(|(i, _)| i)
        .unwrap_or(after_ws.len());

    let category = &after_ws[..category_end];
    let rest = after_ws[category_end..].strip_prefix(':')?;

    let line_len = rest.find('\n').unwrap_or(rest.len());
    let rule = rest[..line_len].trim();
    if rule.is_empty() {
        return None;
    }

    let line_end = offset + category_end + 1 + line_len;
    Some((category.to_string(), rule.to_string(), line_end))
}

/// Find `label` inside `window` and capture its value up to end of line.
///
/// The label only has to start inside the window; the value is read from
/// the full text so a field near the window edge is not cut short.
fn find_field(text: &str, window_start: usize, window: &str, label: &str) -> Option<String> {
    let label_pos = window.find(label)?;
    let value_start = window_start + label_pos + label.len();
    let rest = &text[value_start..];
    let line = &rest[..rest.find('\n').unwrap_or(rest.len())];
    let value = line.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Byte index `count` characters after `from`, clamped to the text length
fn advance_chars(text: &str, from: usize, count: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(count)
        .map(|(i, _)| from + i)
        .unwrap_or(text.len())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_horizontal_ws(c: char) -> bool {
    c == ' ' || c == '\t'
}
