//! Per-session state persistence
//!
//! Each operation loads the whole record, mutates it and writes it back.
//! Overlapping hook processes can lose each other's increments; that is
//! accepted, a crash or a torn record is not.

use crate::error::Result;
use crate::storage::{load_record, save_record, save_record_best_effort, KeyValueStore};
use crate::types::{Counter, SessionState};
use std::sync::Arc;

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the session, or a fresh default when absent or unreadable
    pub async fn load(&self, session_id: &str) -> SessionState {
        let mut state: SessionState = load_record(self.store.as_ref(), session_id)
            .await
            .unwrap_or_default();
        if state.session_id.is_empty() {
            state.session_id = session_id.to_string();
        }
        state
    }

    pub async fn save(&self, state: &SessionState) -> Result<()> {
        save_record(self.store.as_ref(), &state.session_id, state).await
    }

    /// Load, bump `counter`, save. Returns the new value even if the save
    /// failed.
    pub async fn increment(&self, session_id: &str, counter: Counter) -> u64 {
        self.update(session_id, |state| state.increment(counter))
            .await
    }

    /// Load, apply `mutate`, save on a best-effort basis
    pub async fn update<F, R>(&self, session_id: &str, mutate: F) -> R
    where
        F: FnOnce(&mut SessionState) -> R + Send,
    {
        let mut state = self.load(session_id).await;
        let result = mutate(&mut state);
        save_record_best_effort(self.store.as_ref(), session_id, &state).await;
        result
    }
}
