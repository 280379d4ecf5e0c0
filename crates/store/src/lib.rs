//! `safetycheck-store` — persistent local key-value storage.
//!
//! **Responsibility:** durable client-side state: the pending-submission
//! queue, read/dismissed notification id sets, cached session user, cached
//! settings and the endpoint URL.
//!
//! Each component owns a disjoint key namespace (see [`keys`]), so no
//! cross-component coordination is needed beyond read-modify-persist per key.
//! Values are JSON strings.

pub mod keys;
pub mod memory;
pub mod sqlite;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Local storage error.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The value was too large for the store's quota. The caller keeps its
    /// in-memory state and carries on; only the persisted copy is stale.
    #[error("storage quota exceeded for key '{key}' ({size} bytes)")]
    Quota { key: String, size: usize },

    /// Underlying storage failure (I/O, pool, SQL).
    #[error("storage error: {0}")]
    Storage(String),

    /// A persisted value could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serde(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}

/// Durable key-value store.
///
/// Implementations must make `put` durable before returning: callers rely on
/// persist-then-update-memory ordering for crash safety.
#[allow(async_fn_in_trait)]
pub trait LocalStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Read and deserialize a JSON value.
    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize and write a JSON value.
    async fn put_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.put(key, &raw).await
    }
}
