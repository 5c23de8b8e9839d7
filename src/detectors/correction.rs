//! Correction language detection
//!
//! A prompt that tells the agent it got something wrong is counted per
//! session, and the user is nudged to capture the lesson as a `[LEARN]` tag.

use crate::session::SessionStore;
use crate::types::{Advisory, AdvisoryKind, Counter};
use once_cell::sync::Lazy;
use regex::RegexSet;
use tracing::debug;

static CORRECTION_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"\b(wrong|incorrect|mistake|messed up)\b",
        r"\b(undo|revert|rollback|go back)\b",
        r"\b(wait|hold on|no no)\b",
        // "stop" only as a command: leading, standalone or "stop that"
        r"(^|[.!?]\s*)stop\b|\bstop(\s*[,.!?]|\s*$)|\bstop (that|doing|it)\b",
        r"\b(actually|not what i)\b",
        // "instead" closing a clause, not "instead of"; "rather" only as a preference
        r"\binstead(\s*[,.!?]|\s*$)|\b(i'?d|i would) rather\b",
        r"\b(that's not|that was not|that isn't)\b",
        r"\b(fix that|fix this|redo|try again)\b",
    ])
    .expect("correction patterns are valid")
});

/// Whether `prompt` contains correction language
pub fn is_correction(prompt: &str) -> bool {
    CORRECTION_PATTERNS.is_match(&prompt.to_lowercase())
}

pub struct CorrectionDetector {
    sessions: SessionStore,
}

impl CorrectionDetector {
    pub fn new(sessions: SessionStore) -> Self {
        Self { sessions }
    }

    /// Count a correction and return the advisory, or `None` for an
    /// ordinary prompt
    pub async fn observe(&self, session_id: &str, prompt: &str) -> Option<Advisory> {
        if !is_correction(prompt) {
            return None;
        }

        let count = self
            .sessions
            .increment(session_id, Counter::Corrections)
            .await;
        debug!("Correction #{} in session {}", count, session_id);

        Some(Advisory::new(
            AdvisoryKind::Correction,
            format!(
                "Correction detected (#{} this session). Consider capturing with: [LEARN] Category: Rule",
                count
            ),
        ))
    }
}
