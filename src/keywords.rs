//! Keyword extraction for topical comparison of prompts
//!
//! A deliberately small tokenizer: lowercase ASCII words of three or more
//! letters, minus a fixed list of function words and conversational filler.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

/// Minimum token length kept by the extractor
pub const MIN_KEYWORD_LEN: usize = 3;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-z]{3,}\b").expect("keyword pattern is valid"));

/// Function words, pronouns and filler that carry no topic
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being",
    "have", "has", "had", "do", "does", "did", "will", "would", "could",
    "should", "may", "might", "can", "shall", "to", "of", "in", "for",
    "on", "with", "at", "by", "from", "as", "into", "through", "during",
    "before", "after", "above", "below", "between", "and", "but", "or",
    "nor", "not", "so", "yet", "both", "either", "neither", "each",
    "every", "all", "any", "few", "more", "most", "other", "some",
    "such", "no", "only", "own", "same", "than", "too", "very",
    "just", "because", "if", "when", "where", "how", "what", "which",
    "who", "whom", "this", "that", "these", "those", "i", "me", "my",
    "we", "us", "our", "you", "your", "he", "him", "his", "she", "her",
    "it", "its", "they", "them", "their", "please", "thanks", "thank",
    "okay", "yes", "hey", "hello", "also", "now", "then", "there",
    "here", "about", "again", "really", "maybe", "sure",
];

static STOP_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOP_WORDS.iter().copied().collect());

pub fn is_stop_word(word: &str) -> bool {
    STOP_SET.contains(word)
}

/// Extract the normalized keyword set of `text`.
///
/// The result is ordered only for deterministic display; callers should
/// treat it as a set.
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|word| !is_stop_word(word))
        .map(str::to_string)
        .collect()
}

/// Percentage of `anchor` keywords present in `current`.
///
/// `None` when either set is empty, since the ratio is undefined.
pub fn overlap_percent(anchor: &BTreeSet<String>, current: &BTreeSet<String>) -> Option<f64> {
    if anchor.is_empty() || current.is_empty() {
        return None;
    }
    let shared = anchor.intersection(current).count();
    Some(shared as f64 / anchor.len() as f64 * 100.0)
}
