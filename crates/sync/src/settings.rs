//! Company settings cache and sync.
//!
//! Settings are rows in the `System_Settings` table (last row wins). Remote
//! wins over the local cache on every snapshot; saving appends a new row and
//! re-caches locally. The logo is a base64 data URL and can blow the local
//! store's quota, which is tolerated.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;

use safetycheck_core::SystemSettings;
use safetycheck_core::sheet::{SETTINGS_HEADERS, SYSTEM_SETTINGS_TABLE};
use safetycheck_gateway::snapshot::cell_string;
use safetycheck_gateway::{AppendRequest, Gateway, GatewayError, Snapshot};
use safetycheck_store::{LocalStore, StoreError, keys};

/// Minimum length for a logo cell to be treated as real image data rather
/// than a stray placeholder value.
const MIN_LOGO_LEN: usize = 100;

pub struct SettingsManager<S, G> {
    store: Arc<S>,
    gateway: Arc<G>,
    current: Mutex<SystemSettings>,
}

impl<S: LocalStore, G: Gateway> SettingsManager<S, G> {
    /// Load, preferring the cached copy until a snapshot arrives.
    pub async fn load(store: Arc<S>, gateway: Arc<G>) -> Self {
        let current = match store.get_json::<SystemSettings>(keys::SETTINGS).await {
            Ok(Some(settings)) => settings,
            Ok(None) => SystemSettings::default(),
            Err(err) => {
                tracing::warn!(%err, "failed to restore cached settings");
                SystemSettings::default()
            }
        };
        Self {
            store,
            gateway,
            current: Mutex::new(current),
        }
    }

    pub async fn current(&self) -> SystemSettings {
        self.current.lock().await.clone()
    }

    /// Adopt the latest remote settings row, if the snapshot has a usable
    /// one.
    pub async fn apply_snapshot(&self, snapshot: &Snapshot) -> Option<SystemSettings> {
        let row = snapshot.latest_settings_row()?;
        if row.len() < 2 {
            return None;
        }

        let settings = SystemSettings {
            company_name: cell_string(&row, 0)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| SystemSettings::default().company_name),
            manager_email: cell_string(&row, 1).unwrap_or_default(),
            company_logo: cell_string(&row, 4).filter(|logo| logo.len() > MIN_LOGO_LEN),
        };

        self.cache(&settings).await;
        *self.current.lock().await = settings.clone();
        Some(settings)
    }

    /// Persist settings locally and append a new row remotely.
    pub async fn save(
        &self,
        settings: SystemSettings,
        endpoint: &str,
    ) -> Result<(), GatewayError> {
        if let Err(err) = self.store.put_json(keys::ENDPOINT_URL, &endpoint).await {
            tracing::warn!(%err, "failed to cache endpoint URL");
        }
        self.cache(&settings).await;

        let row: Vec<Value> = vec![
            settings.company_name.clone().into(),
            settings.manager_email.clone().into(),
            endpoint.into(),
            Utc::now().to_rfc3339().into(),
            settings.company_logo.clone().unwrap_or_default().into(),
        ];
        let request = AppendRequest::create(
            SYSTEM_SETTINGS_TABLE,
            SETTINGS_HEADERS.iter().map(|h| h.to_string()).collect(),
            row,
            format!("CFG_{}", Utc::now().timestamp_millis()),
        );
        self.gateway.append(&request).await?;

        *self.current.lock().await = settings;
        Ok(())
    }

    /// Quota failures are survivable: the session keeps the in-memory copy.
    async fn cache(&self, settings: &SystemSettings) {
        match self.store.put_json(keys::SETTINGS, settings).await {
            Ok(()) => {}
            Err(StoreError::Quota { size, .. }) => {
                tracing::warn!(size, "settings too large to cache; kept in memory only");
            }
            Err(err) => {
                tracing::error!(%err, "failed to cache settings");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGateway;
    use safetycheck_store::MemoryStore;
    use serde_json::json;

    async fn manager(
        store: Arc<MemoryStore>,
        gateway: Arc<MockGateway>,
    ) -> SettingsManager<MemoryStore, MockGateway> {
        SettingsManager::load(store, gateway).await
    }

    #[tokio::test]
    async fn snapshot_last_row_wins() {
        let snap = Snapshot::from_value(json!({
            "System_Settings": [
                ["Company_Name", "Manager_Email", "Active_Script_URL", "Last_Updated", "Company_Logo"],
                ["Old Co.", "old@x.com", "", "", ""],
                ["New Co.", "new@x.com", "", "", ""],
            ]
        }))
        .unwrap();

        let mgr = manager(Arc::new(MemoryStore::new()), Arc::new(MockGateway::new())).await;
        let settings = mgr.apply_snapshot(&snap).await.unwrap();
        assert_eq!(settings.company_name, "New Co.");
        assert_eq!(settings.manager_email, "new@x.com");
        assert_eq!(mgr.current().await.company_name, "New Co.");
    }

    #[tokio::test]
    async fn short_logo_cells_are_ignored() {
        let long_logo = "x".repeat(200);
        let snap = Snapshot::from_value(json!({
            "System_Settings": [
                ["Company_Name", "Manager_Email", "Active_Script_URL", "Last_Updated", "Company_Logo"],
                ["Co", "a@x.com", "", "", "tiny"],
                ["Co", "a@x.com", "", "", long_logo],
            ]
        }))
        .unwrap();

        let mgr = manager(Arc::new(MemoryStore::new()), Arc::new(MockGateway::new())).await;
        let settings = mgr.apply_snapshot(&snap).await.unwrap();
        assert_eq!(settings.company_logo.unwrap().len(), 200);
    }

    #[tokio::test]
    async fn quota_failure_keeps_in_memory_settings() {
        let store = Arc::new(MemoryStore::with_value_limit(16));
        let snap = Snapshot::from_value(json!({
            "System_Settings": [
                ["Company_Name", "Manager_Email"],
                ["A Rather Long Company Name", "boss@example.com"],
            ]
        }))
        .unwrap();

        let mgr = manager(store.clone(), Arc::new(MockGateway::new())).await;
        let settings = mgr.apply_snapshot(&snap).await.unwrap();
        assert_eq!(settings.company_name, "A Rather Long Company Name");
        assert_eq!(mgr.current().await, settings);
        assert!(store.get(keys::SETTINGS).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_appends_a_settings_row() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(MockGateway::new());
        let mgr = manager(store.clone(), gateway.clone()).await;

        let settings = SystemSettings {
            company_name: "Co".to_string(),
            manager_email: "a@x.com".to_string(),
            company_logo: None,
        };
        mgr.save(settings.clone(), "https://example.test/exec")
            .await
            .unwrap();

        let appended = gateway.appended();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].sheet, SYSTEM_SETTINGS_TABLE);
        assert!(appended[0].id.starts_with("CFG_"));
        assert_eq!(appended[0].row[0], "Co");
        assert_eq!(appended[0].row[2], "https://example.test/exec");

        let cached: SystemSettings = store.get_json(keys::SETTINGS).await.unwrap().unwrap();
        assert_eq!(cached, settings);
        let endpoint: String = store.get_json(keys::ENDPOINT_URL).await.unwrap().unwrap();
        assert_eq!(endpoint, "https://example.test/exec");
    }
}
