//! Topical drift detection
//!
//! The first prompt of a session is the anchor: its keywords are stored once
//! and never changed. Every later prompt bumps the prompt count, and once
//! both the prompt count and the session's edit count reach their minimums
//! the prompt's keywords are compared against the anchor. A low overlap
//! produces a warning on every qualifying prompt, not just the first.

use crate::config::DriftConfig;
use crate::keywords::{extract_keywords, overlap_percent};
use crate::session::SessionStore;
use crate::storage::{load_record, save_record_best_effort, KeyValueStore};
use crate::types::{Advisory, AdvisoryKind, DriftState};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Drift warning for the current prompt
#[derive(Debug, Clone, PartialEq)]
pub struct DriftWarning {
    /// Percentage of original keywords present in the prompt
    pub relevance: f64,

    /// Alphabetically first original keywords, for display
    pub original_keywords: Vec<String>,
}

impl DriftWarning {
    pub fn to_advisory(&self) -> Advisory {
        Advisory::new(
            AdvisoryKind::Drift,
            format!(
                "Drift detected: current prompt has {:.0}% relevance to original intent (original keywords: {}). Consider refocusing or starting a new session.",
                self.relevance,
                self.original_keywords.join(", ")
            ),
        )
    }
}

pub struct DriftDetector {
    store: Arc<dyn KeyValueStore>,
    sessions: SessionStore,
    config: DriftConfig,
}

impl DriftDetector {
    pub fn new(store: Arc<dyn KeyValueStore>, sessions: SessionStore, config: DriftConfig) -> Self {
        Self {
            store,
            sessions,
            config,
        }
    }

    /// Current drift record of a session, if it has seen a prompt
    pub async fn state(&self, session_id: &str) -> Option<DriftState> {
        load_record(self.store.as_ref(), session_id).await
    }

    /// Record `prompt` for the session and check it for drift
    pub async fn observe(&self, session_id: &str, prompt: &str) -> Option<DriftWarning> {
        let current = extract_keywords(prompt);

        let state = match self.state(session_id).await {
            None => DriftState {
                session_id: session_id.to_string(),
                original_keywords: current.clone(),
                prompt_count: 1,
            },
            Some(mut state) => {
                state.prompt_count += 1;
                state
            }
        };
        save_record_best_effort(self.store.as_ref(), session_id, &state).await;

        if state.prompt_count < self.config.min_prompts {
            return None;
        }

        let edit_count = self.sessions.load(session_id).await.edit_count;
        self.evaluate(&state, &current, edit_count)
    }

    /// Decide whether `current` has drifted from the anchor in `state`
    pub fn evaluate(
        &self,
        state: &DriftState,
        current: &BTreeSet<String>,
        edit_count: u64,
    ) -> Option<DriftWarning> {
        if state.prompt_count < self.config.min_prompts || edit_count < self.config.min_edits {
            return None;
        }

        let relevance = overlap_percent(&state.original_keywords, current)?;
        debug!(
            "Drift check for {}: {:.1}% relevance after {} prompts, {} edits",
            state.session_id, relevance, state.prompt_count, edit_count
        );
        if relevance >= self.config.relevance_threshold {
            return None;
        }

        Some(DriftWarning {
            relevance,
            original_keywords: state
                .original_keywords
                .iter()
                .take(self.config.max_keywords_shown)
                .cloned()
                .collect(),
        })
    }
}
