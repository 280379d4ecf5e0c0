//! In-memory store for tests and development.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::{LocalStore, StoreError};

/// Non-durable `LocalStore` backed by a hash map.
///
/// An optional per-value size limit emulates the quota behavior of
/// browser-style storage, which the notification/settings paths must
/// tolerate.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
    value_limit: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects values larger than `bytes` with
    /// [`StoreError::Quota`].
    pub fn with_value_limit(bytes: usize) -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            value_limit: Some(bytes),
        }
    }

    fn lock_err() -> StoreError {
        StoreError::Storage("memory store lock poisoned".to_string())
    }
}

impl LocalStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.read().map_err(|_| Self::lock_err())?;
        Ok(values.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(limit) = self.value_limit {
            if value.len() > limit {
                return Err(StoreError::Quota {
                    key: key.to_string(),
                    size: value.len(),
                });
            }
        }
        let mut values = self.values.write().map_err(|_| Self::lock_err())?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.write().map_err(|_| Self::lock_err())?;
        values.remove(key);
        Ok(())
    }
}
