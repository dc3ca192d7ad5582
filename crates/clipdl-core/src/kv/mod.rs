//! Key/value persistence facility behind the record store.
//!
//! The record store only needs `get`/`set` over string payloads under a
//! namespaced key; anything that satisfies that (SQLite file, in-process map,
//! remote service) can back it.

mod memory;
mod sqlite;

pub use memory::MemoryKv;
pub use sqlite::SqliteKv;

use async_trait::async_trait;

/// Error from a key/value backend.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// String key/value store. Implementations must make a completed `set`
/// visible to every later `get`, including from other handles to the same
/// backing storage.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Returns the stored payload, or `None` if the key was never set.
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Stores `value` under `key`, replacing any previous payload.
    async fn set(&self, key: &str, value: &str) -> Result<(), KvError>;
}
