//! Storage layer for the hook engine
//!
//! Every persistent record (the learnings collection, one session record per
//! session, one drift record per session) is a whole JSON document loaded and
//! saved by key. There is no cross-process locking: concurrent hook
//! invocations may race, and the contract is last-write-wins without
//! corruption, which the file backend gets from write-then-rename.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Key-value store of whole JSON documents
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Load the document stored under `key`.
    ///
    /// `Ok(None)` when nothing is stored; `Err` when the document exists but
    /// cannot be read or parsed.
    async fn load(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the document stored under `key`
    async fn save(&self, key: &str, value: &Value) -> Result<()>;
}

/// Load and decode a record, treating absent, unreadable or corrupt records
/// as missing. Never fails.
pub async fn load_record<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let value = match store.load(key).await {
        Ok(Some(value)) => value,
        Ok(None) => return None,
        Err(e) => {
            debug!("Treating unreadable record '{}' as empty: {}", key, e);
            return None;
        }
    };

    match serde_json::from_value(value) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!("Treating malformed record '{}' as empty: {}", key, e);
            None
        }
    }
}

/// Encode and save a record
pub async fn save_record<T: Serialize>(store: &dyn KeyValueStore, key: &str, record: &T) -> Result<()> {
    let value = serde_json::to_value(record)?;
    store.save(key, &value).await
}

/// Save a record, logging instead of failing. Returns whether it was written.
pub async fn save_record_best_effort<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    record: &T,
) -> bool {
    match save_record(store, key, record).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to persist '{}': {}", key, e);
            false
        }
    }
}

/// Map an externally assigned id onto a file-safe key
pub fn sanitize_key(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}
