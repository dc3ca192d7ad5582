//! Persistent record of already-downloaded canonical ids.
//!
//! The set lives under one namespaced key as newline-joined, trimmed entries.
//! There is no in-process cache: every query re-reads the backend so that
//! independently triggered downloads, batches, and bulk edits all see the
//! same state. Mutations are serialized per store so read-modify-write cycles
//! never lose an entry.
//!
//! Removing a record never touches files on disk.

mod bulk;
mod legacy;

pub use bulk::{apply_bulk_edit, split_bulk_text};

use std::collections::HashSet;
use std::sync::Arc;

use crate::kv::{KvBackend, KvError};

/// Default key the record set is stored under.
pub const DEFAULT_RECORDS_KEY: &str = "clipdl_download_records";

/// Error from a record store operation.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("record store backend: {0}")]
    Backend(#[from] KvError),
}

/// Handle to the persisted record set. Cheap to clone; clones share the
/// backend and the mutation lock.
#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn KvBackend>,
    key: String,
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore").field("key", &self.key).finish()
    }
}

impl RecordStore {
    pub fn new(backend: Arc<dyn KvBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Namespaced key this store persists under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current stored sequence (deduplicated, first-seen order).
    pub async fn list(&self) -> Result<Vec<String>, RecordError> {
        self.load().await
    }

    pub async fn contains(&self, id: &str) -> Result<bool, RecordError> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(false);
        }
        Ok(self.load().await?.iter().any(|r| r == id))
    }

    /// Append one id. Empty or whitespace-only ids are ignored.
    pub async fn add(&self, id: &str) -> Result<(), RecordError> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_locked().await?;
        if records.iter().any(|r| r == id) {
            return Ok(());
        }
        records.push(id.to_string());
        self.persist(records).await?;
        tracing::debug!(key = %self.key, id, "recorded download");
        Ok(())
    }

    /// Replace the whole set. Returns what was actually stored.
    pub async fn replace_all<I, S>(&self, ids: I) -> Result<Vec<String>, RecordError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let _guard = self.write_lock.lock().await;
        let stored = self.persist(ids).await?;
        tracing::info!(key = %self.key, count = stored.len(), "replaced download records");
        Ok(stored)
    }

    /// Remove one id if present. Returns whether anything was removed.
    pub async fn remove(&self, id: &str) -> Result<bool, RecordError> {
        let id = id.trim();
        let _guard = self.write_lock.lock().await;
        let records = self.load_locked().await?;
        let before = records.len();
        let kept: Vec<String> = records.into_iter().filter(|r| r != id).collect();
        if kept.len() == before {
            return Ok(false);
        }
        self.persist(kept).await?;
        tracing::info!(key = %self.key, id, "removed download record");
        Ok(true)
    }

    pub async fn clear(&self) -> Result<(), RecordError> {
        let _guard = self.write_lock.lock().await;
        self.backend.set(&self.key, "").await?;
        tracing::info!(key = %self.key, "cleared download records");
        Ok(())
    }

    /// Unlocked read. A legacy payload is re-read and migrated under the
    /// write lock.
    async fn load(&self) -> Result<Vec<String>, RecordError> {
        let Some(raw) = self.backend.get(&self.key).await? else {
            return Ok(Vec::new());
        };
        if legacy::decode(&raw).is_none() {
            return Ok(normalize(raw.split('\n')));
        }

        let _guard = self.write_lock.lock().await;
        self.load_locked().await
    }

    /// Read with the write lock held; migrates a legacy payload in place.
    async fn load_locked(&self) -> Result<Vec<String>, RecordError> {
        let Some(raw) = self.backend.get(&self.key).await? else {
            return Ok(Vec::new());
        };

        if let Some(names) = legacy::decode(&raw) {
            tracing::info!(
                key = %self.key,
                count = names.len(),
                "migrating legacy download records"
            );
            return self.persist(names).await;
        }

        Ok(normalize(raw.split('\n')))
    }

    async fn persist<I, S>(&self, ids: I) -> Result<Vec<String>, RecordError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records = normalize(ids);
        self.backend.set(&self.key, &records.join("\n")).await?;
        Ok(records)
    }
}

/// Trim, drop blanks, dedup keeping first occurrence.
fn normalize<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
