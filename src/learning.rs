//! Persistent, deduplicated store of learned rules
//!
//! The whole collection is one document. A submission batch is one
//! read-modify-write, so a stop event that carries several annotations costs
//! a single rewrite. The store is advisory: a corrupt document reads as an
//! empty collection and write failures are logged, never raised.

use crate::annotation::Annotation;
use crate::storage::{load_record, save_record_best_effort, KeyValueStore};
use crate::types::LearningRecord;
use serde_json::Value;
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, warn};

/// Key of the learnings document
pub const LEARNINGS_KEY: &str = "learnings";

/// Result of submitting one rule
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub record: LearningRecord,
    /// `true` if the rule was new, `false` if an existing record was bumped
    pub created: bool,
}

/// Outcome of a batch submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub created: usize,
    pub repeated: usize,
    /// Whether the rewrite reached storage
    pub persisted: bool,
}

/// Stored learnings plus the elements that could not be decoded
#[derive(Debug, Default)]
struct Collection {
    records: Vec<LearningRecord>,
    unreadable: Vec<Value>,
}

pub struct LearningStore {
    store: Arc<dyn KeyValueStore>,
}

impl LearningStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Every readable stored record; empty when the document is missing or
    /// is not an array
    pub async fn all(&self) -> Vec<LearningRecord> {
        self.load().await.records
    }

    /// Decode the collection element by element. Elements that do not decode
    /// are kept aside untouched so a rewrite carries them over.
    async fn load(&self) -> Collection {
        let raw: Vec<Value> = load_record(self.store.as_ref(), LEARNINGS_KEY)
            .await
            .unwrap_or_default();

        let mut collection = Collection::default();
        for value in raw {
            match serde_json::from_value::<LearningRecord>(value.clone()) {
                Ok(record) => collection.records.push(record),
                Err(e) => {
                    debug!("Keeping unreadable learning as-is: {}", e);
                    collection.unreadable.push(value);
                }
            }
        }
        collection
    }

    /// Rewrite the collection. Returns whether it reached storage.
    async fn persist(&self, collection: &Collection) -> bool {
        let mut document = Vec::with_capacity(collection.records.len() + collection.unreadable.len());
        for record in &collection.records {
            match serde_json::to_value(record) {
                Ok(value) => document.push(value),
                Err(e) => {
                    warn!("Failed to encode learning '{}': {}", record.rule, e);
                    return false;
                }
            }
        }
        document.extend(collection.unreadable.iter().cloned());
        save_record_best_effort(self.store.as_ref(), LEARNINGS_KEY, &document).await
    }

    /// Submit a single rule
    pub async fn submit(
        &self,
        category: &str,
        rule: &str,
        mistake: Option<&str>,
        correction: Option<&str>,
        project: &str,
    ) -> Submission {
        let mut collection = self.load().await;
        let submission = merge(
            &mut collection.records,
            category,
            rule,
            mistake,
            correction,
            project,
        );
        self.persist(&collection).await;
        submission
    }

    /// Submit every parsed annotation with a single rewrite.
    ///
    /// Nothing is written for an empty batch.
    pub async fn submit_batch(&self, annotations: &[Annotation], project: &str) -> BatchSummary {
        if annotations.is_empty() {
            return BatchSummary::default();
        }

        let mut collection = self.load().await;
        let mut summary = BatchSummary::default();
        for annotation in annotations {
            let submission = merge(
                &mut collection.records,
                &annotation.category,
                &annotation.rule,
                annotation.mistake.as_deref(),
                annotation.correction.as_deref(),
                project,
            );
            if submission.created {
                summary.created += 1;
            } else {
                summary.repeated += 1;
            }
        }

        summary.persisted = self.persist(&collection).await;
        debug!(
            "Learning batch: {} new, {} repeated",
            summary.created, summary.repeated
        );
        summary
    }

    /// Records of `project` (case-insensitive); all records if the project
    /// has none, so a renamed or fresh checkout still benefits.
    pub async fn query(&self, project: &str) -> Vec<LearningRecord> {
        let records = self.all().await;
        let wanted = project.to_lowercase();
        let scoped: Vec<LearningRecord> = records
            .iter()
            .filter(|r| r.project.to_lowercase() == wanted)
            .cloned()
            .collect();

        if scoped.is_empty() {
            records
        } else {
            scoped
        }
    }

    /// `query` ranked by times applied, then recency, truncated to `n`
    pub async fn top(&self, project: &str, n: usize) -> Vec<LearningRecord> {
        let mut records = self.query(project).await;
        records.sort_by_key(|r| (Reverse(r.times_applied), Reverse(r.created_at)));
        records.truncate(n);
        records
    }
}

/// Merge one rule into `records`: bump the existing record or append a new one
fn merge(
    records: &mut Vec<LearningRecord>,
    category: &str,
    rule: &str,
    mistake: Option<&str>,
    correction: Option<&str>,
    project: &str,
) -> Submission {
    if let Some(existing) = records.iter_mut().find(|r| r.matches(category, rule)) {
        existing.times_applied += 1;
        return Submission {
            record: existing.clone(),
            created: false,
        };
    }

    let mut record = LearningRecord::new(category, rule, project);
    record.mistake = non_empty(mistake);
    record.correction = non_empty(correction);
    records.push(record.clone());
    Submission {
        record,
        created: true,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Session-start context listing the top learnings
pub fn render_learnings(records: &[LearningRecord]) -> Option<String> {
    if records.is_empty() {
        return None;
    }

    let mut lines = vec![format!(
        "[pro-workflow] {} learnings loaded for this project:",
        records.len()
    )];
    for record in records {
        let category = if record.category.is_empty() {
            "General"
        } else {
            record.category.as_str()
        };
        let suffix = if record.times_applied > 0 {
            format!(" (applied {}x)", record.times_applied)
        } else {
            String::new()
        };
        lines.push(format!("  [{}] {}{}", category, record.rule, suffix));
    }

    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn store() -> (Arc<MemoryStore>, LearningStore) {
        let backend = Arc::new(MemoryStore::new());
        let learnings = LearningStore::new(backend.clone());
        (backend, learnings)
    }

    #[tokio::test]
    async fn test_duplicate_submission_increments() {
        let (_, learnings) = store();

        let first = learnings
            .submit("Testing", "Always run tests", None, None, "demo")
            .await;
        assert!(first.created);
        assert_eq!(first.record.times_applied, 0);

        let second = learnings
            .submit(" testing", "ALWAYS RUN TESTS ", Some("other"), None, "demo")
            .await;
        assert!(!second.created);
        assert_eq!(second.record.times_applied, 1);

        let all = learnings.all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].times_applied, 1);
        assert_eq!(all[0].mistake, None);
    }

    #[tokio::test]
    async fn test_trailing_punctuation_is_distinct() {
        let (_, learnings) = store();
        learnings.submit("Style", "Use rustfmt", None, None, "demo").await;
        let second = learnings.submit("Style", "Use rustfmt.", None, None, "demo").await;
        assert!(second.created);
        assert_eq!(learnings.all().await.len(), 2);
    }

    #[tokio::test]
    async fn test_batch_dedups_within_batch() {
        let (_, learnings) = store();
        let annotation = Annotation {
            category: "Git".to_string(),
            rule: "Rebase daily".to_string(),
            mistake: Some("Merged main".to_string()),
            correction: None,
        };

        let summary = learnings
            .submit_batch(&[annotation.clone(), annotation], "demo")
            .await;
        assert_eq!(summary.created, 1);
        assert_eq!(summary.repeated, 1);
        assert!(summary.persisted);

        let all = learnings.all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].times_applied, 1);
        assert_eq!(all[0].mistake.as_deref(), Some("Merged main"));
    }

    #[tokio::test]
    async fn test_empty_batch_writes_nothing() {
        let (backend, learnings) = store();
        let summary = learnings.submit_batch(&[], "demo").await;
        assert_eq!(summary, BatchSummary::default());
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_corrupt_store_reads_empty() {
        let (backend, learnings) = store();
        backend
            .save(LEARNINGS_KEY, &json!({"unexpected": "shape"}))
            .await
            .unwrap();

        assert!(learnings.query("demo").await.is_empty());

        // A later submission starts over from an empty collection
        let submission = learnings.submit("Git", "Rebase", None, None, "demo").await;
        assert!(submission.created);
        assert_eq!(learnings.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_odd_records_do_not_hide_or_drop_the_rest() {
        let (backend, learnings) = store();
        backend
            .save(
                LEARNINGS_KEY,
                &json!([
                    {"date": "2025-01-10T08:00:00", "project": "demo", "category": "Git",
                     "rule": "Rebase daily", "times_applied": 4},
                    {"project": "demo", "category": "Style", "rule": "No date here"},
                    {"date": "2025-01-12T08:00:00", "project": "demo", "category": "Docs",
                     "rule": "Update the changelog", "times_applied": 2},
                    {"date": "not a date", "category": "Broken", "rule": "Bad timestamp"},
                ]),
            )
            .await
            .unwrap();

        assert_eq!(learnings.query("demo").await.len(), 3);

        let submission = learnings
            .submit("Testing", "Run tests first", None, None, "demo")
            .await;
        assert!(submission.created);

        let all = learnings.all().await;
        assert_eq!(all.len(), 4);
        let rebase = all.iter().find(|r| r.rule == "Rebase daily").unwrap();
        assert_eq!(rebase.times_applied, 4);

        // The undecodable element survives the rewrite verbatim
        let raw = backend.load(LEARNINGS_KEY).await.unwrap().unwrap();
        let raw = raw.as_array().unwrap();
        assert_eq!(raw.len(), 5);
        assert!(raw.iter().any(|v| v["date"] == "not a date"));
    }

    #[tokio::test]
    async fn test_query_scopes_by_project_with_global_fallback() {
        let (_, learnings) = store();
        learnings.submit("A", "alpha rule", None, None, "Alpha").await;
        learnings.submit("B", "beta rule", None, None, "beta").await;

        let alpha = learnings.query("alpha").await;
        assert_eq!(alpha.len(), 1);
        assert_eq!(alpha[0].rule, "alpha rule");

        let unknown = learnings.query("gamma").await;
        assert_eq!(unknown.len(), 2);
    }

    #[tokio::test]
    async fn test_top_orders_by_use_then_recency() {
        let (backend, learnings) = store();
        let now = Utc::now();
        let mut old_popular = LearningRecord::new("A", "old popular", "demo");
        old_popular.created_at = now - Duration::days(10);
        old_popular.times_applied = 5;
        let mut recent = LearningRecord::new("B", "recent", "demo");
        recent.created_at = now;
        let mut older = LearningRecord::new("C", "older", "demo");
        older.created_at = now - Duration::days(1);

        backend
            .save(
                LEARNINGS_KEY,
                &serde_json::to_value(vec![older, recent, old_popular]).unwrap(),
            )
            .await
            .unwrap();

        let top = learnings.top("demo", 2).await;
        let rules: Vec<&str> = top.iter().map(|r| r.rule.as_str()).collect();
        assert_eq!(rules, vec!["old popular", "recent"]);
    }

    #[test]
    fn test_render_learnings() {
        let mut applied = LearningRecord::new("Testing", "Run tests first", "demo");
        applied.times_applied = 3;
        let fresh = LearningRecord::new("", "Keep commits small", "demo");

        let rendered = render_learnings(&[applied, fresh]).unwrap();
        assert_eq!(
            rendered,
            "[pro-workflow] 2 learnings loaded for this project:\n  [Testing] Run tests first (applied 3x)\n  [General] Keep commits small"
        );
        assert!(render_learnings(&[]).is_none());
    }
}
