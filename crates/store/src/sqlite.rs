//! Durable store persisted in SQLite.
//!
//! Key-value rows in a single `kv_store` table. The pool is initialized
//! lazily on first use so constructing the store never touches the
//! filesystem.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use crate::{LocalStore, StoreError};

/// SQLite-backed `LocalStore`.
///
/// Cheap to clone and safe to share across tasks.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Arc<tokio::sync::Mutex<Option<SqlitePool>>>,
    location: Location,
}

#[derive(Debug, Clone)]
enum Location {
    Default,
    Path(PathBuf),
    Memory,
}

impl SqliteStore {
    /// Store under the OS app-data directory (`{data_dir}/safetycheck/local.db`).
    pub fn new() -> Self {
        Self {
            pool: Arc::new(tokio::sync::Mutex::new(None)),
            location: Location::Default,
        }
    }

    /// Store at an explicit database file path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            pool: Arc::new(tokio::sync::Mutex::new(None)),
            location: Location::Path(path.into()),
        }
    }

    /// Transient store for tests.
    pub fn in_memory() -> Self {
        Self {
            pool: Arc::new(tokio::sync::Mutex::new(None)),
            location: Location::Memory,
        }
    }

    async fn ensure_initialized(&self) -> anyhow::Result<()> {
        let mut pool_guard = self.pool.lock().await;
        if pool_guard.is_some() {
            return Ok(());
        }

        let options = match &self.location {
            Location::Memory => SqliteConnectOptions::from_str("sqlite::memory:")
                .context("failed to build in-memory SQLite options")?,
            Location::Path(path) => {
                ensure_parent_dir(path)?;
                SqliteConnectOptions::new().filename(path).create_if_missing(true)
            }
            Location::Default => {
                let path = default_db_path()
                    .context("failed to determine local store DB path")?;
                ensure_parent_dir(&path)?;
                SqliteConnectOptions::new().filename(&path).create_if_missing(true)
            }
        };

        // One connection keeps writes serialized and makes the in-memory
        // database visible to every caller.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("failed to create SQLite pool for local store")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create kv_store table")?;

        *pool_guard = Some(pool);
        Ok(())
    }

    async fn get_pool(&self) -> Result<SqlitePool, StoreError> {
        self.ensure_initialized()
            .await
            .map_err(|err| StoreError::Storage(format!("{err:#}")))?;
        let pool_guard = self.pool.lock().await;
        pool_guard
            .as_ref()
            .cloned()
            .ok_or_else(|| StoreError::Storage("local store pool missing after init".to_string()))
    }
}

impl Default for SqliteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let pool = self.get_pool().await?;
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&pool)
            .await
            .map_err(|err| StoreError::Storage(err.to_string()))?;

        match row {
            Some(row) => {
                let value: String = row
                    .try_get("value")
                    .map_err(|err| StoreError::Storage(err.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let pool = self.get_pool().await?;
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value      = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&pool)
        .await
        .map_err(|err| StoreError::Storage(err.to_string()))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let pool = self.get_pool().await?;
        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&pool)
            .await
            .map_err(|err| StoreError::Storage(err.to_string()))?;
        Ok(())
    }
}

fn ensure_parent_dir(path: &PathBuf) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create local store directory at {parent:?}"))?;
    }
    Ok(())
}

/// Resolve the default SQLite path: `{app_data_dir}/safetycheck/local.db`.
fn default_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory")?;

    let mut dir = base;
    dir.push("safetycheck");
    dir.push("local.db");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip_in_memory() {
        let store = SqliteStore::in_memory();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.put("k", "v1").await.unwrap();
        store.put("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));

        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn survives_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.db");

        {
            let store = SqliteStore::at_path(&path);
            store.put("queue", "[1,2,3]").await.unwrap();
        }

        let reopened = SqliteStore::at_path(&path);
        assert_eq!(reopened.get("queue").await.unwrap().as_deref(), Some("[1,2,3]"));
    }
}
