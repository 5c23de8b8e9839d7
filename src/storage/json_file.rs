//! One JSON file per key under a directory

use crate::error::Result;
use crate::storage::{sanitize_key, KeyValueStore};
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// File-backed store: key `k` lives at `<dir>/<prefix>k.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    prefix: String,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self::with_prefix(dir, "")
    }

    pub fn with_prefix<P: AsRef<Path>>(dir: P, prefix: &str) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            prefix: prefix.to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for a key
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}.json", self.prefix, sanitize_key(key)))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let value = serde_json::from_str(&contents)?;
        Ok(Some(value))
    }

    async fn save(&self, key: &str, value: &Value) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(key);
        let body = serde_json::to_string_pretty(value)?;

        // Readers see either the old document or the new one, never a torn write
        let tmp = self.dir.join(format!(".{}.{}.tmp", sanitize_key(key), Uuid::new_v4()));
        fs::write(&tmp, body).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!("Saved {}", path.display());
        Ok(())
    }
}
