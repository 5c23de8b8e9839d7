//! Periodic wrap-up reminder, counted in agent responses

use crate::session::SessionStore;
use crate::types::{Advisory, AdvisoryKind, Counter};

pub struct WrapUpReminder {
    sessions: SessionStore,
    interval: u64,
}

impl WrapUpReminder {
    pub fn new(sessions: SessionStore, interval: u64) -> Self {
        Self {
            sessions,
            interval: interval.max(1),
        }
    }

    /// Count one response; remind on every `interval`-th
    pub async fn observe(&self, session_id: &str) -> Option<Advisory> {
        let count = self
            .sessions
            .increment(session_id, Counter::Responses)
            .await;
        if count == 0 || count % self.interval != 0 {
            return None;
        }

        Some(Advisory::new(
            AdvisoryKind::Reminder,
            format!(
                "{} responses this session. Consider running /pro-workflow:wrap-up to capture learnings.",
                count
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_reminds_every_interval() {
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
        let reminder = WrapUpReminder::new(sessions.clone(), 3);

        let mut fired = Vec::new();
        for _ in 0..7 {
            fired.push(reminder.observe("s").await.is_some());
        }

        assert_eq!(fired, vec![false, false, true, false, false, true, false]);
        assert_eq!(sessions.load("s").await.response_count, 7);
    }

    #[tokio::test]
    async fn test_default_interval_message() {
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
        let mut state = sessions.load("s").await;
        state.response_count = 19;
        sessions.save(&state).await.unwrap();

        let advisory = WrapUpReminder::new(sessions, 20)
            .observe("s")
            .await
            .unwrap();
        assert!(advisory.message.starts_with("20 responses this session."));
    }
}
