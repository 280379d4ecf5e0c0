//! Trigger glue between connectivity, the queue and the notification feed.
//!
//! The service owns the trigger policy: a flush runs on an offline-to-online
//! transition, opportunistically when a data-bearing view becomes active
//! while online with a non-empty queue, or on explicit user action. Never on
//! a timer.

use std::sync::Arc;

use safetycheck_core::{AlertId, AlertRecord};
use safetycheck_gateway::{AppendRequest, Gateway};
use safetycheck_store::LocalStore;

use crate::connectivity::ConnectivityMonitor;
use crate::notice::{Notice, NoticeSink};
use crate::notifications::{ModuleTarget, NotificationCenter};
use crate::queue::{FlushReport, OfflineQueue, SubmissionOutcome, SubmitError};
use crate::session::SessionManager;
use crate::settings::SettingsManager;

pub struct SyncService<S, G> {
    gateway: Arc<G>,
    connectivity: Arc<ConnectivityMonitor>,
    notices: NoticeSink,
    queue: OfflineQueue<S, G>,
    notifications: NotificationCenter<S, G>,
    session: SessionManager<S, G>,
    settings: SettingsManager<S, G>,
}

impl<S: LocalStore, G: Gateway> SyncService<S, G> {
    /// Load every component, restoring persisted state.
    pub async fn load(
        store: Arc<S>,
        gateway: Arc<G>,
        initially_online: bool,
        notices: NoticeSink,
    ) -> Self {
        let connectivity = Arc::new(ConnectivityMonitor::new(initially_online));
        let queue = OfflineQueue::load(
            store.clone(),
            gateway.clone(),
            connectivity.clone(),
            notices.clone(),
        )
        .await;
        let notifications = NotificationCenter::load(
            store.clone(),
            gateway.clone(),
            connectivity.clone(),
            notices.clone(),
        )
        .await;
        let session = SessionManager::load(store.clone(), gateway.clone()).await;
        let settings = SettingsManager::load(store, gateway.clone()).await;
        Self {
            gateway,
            connectivity,
            notices,
            queue,
            notifications,
            session,
            settings,
        }
    }

    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    pub fn queue(&self) -> &OfflineQueue<S, G> {
        &self.queue
    }

    pub fn notifications(&self) -> &NotificationCenter<S, G> {
        &self.notifications
    }

    pub fn session(&self) -> &SessionManager<S, G> {
        &self.session
    }

    pub fn settings(&self) -> &SettingsManager<S, G> {
        &self.settings
    }

    /// Feed a platform connectivity signal in. An offline→online edge drains
    /// the queue and refreshes the feed; going offline triggers nothing.
    pub async fn set_online(&self, online: bool) {
        if self.connectivity.set_online(online) && online {
            self.handle_online().await;
        }
    }

    async fn handle_online(&self) {
        self.notices.emit(Notice::back_online());
        self.queue.flush().await;
        // Refresh after the flush so the feed sees the freshly synced rows.
        self.refresh().await;
    }

    /// A view that depends on fresh data became active. While online, drain
    /// any backlog and refresh the feed.
    pub async fn on_view_activated(&self) {
        if !self.connectivity.is_online() {
            return;
        }
        if !self.queue.is_empty().await {
            self.queue.flush().await;
        }
        self.refresh().await;
    }

    /// Explicit user-initiated sync.
    pub async fn sync_now(&self) -> FlushReport {
        let report = self.queue.flush().await;
        if report.delivered > 0 {
            self.refresh().await;
        }
        report
    }

    /// Submit a finalized inspection record, enforcing the view-only guard.
    pub async fn submit_record(
        &self,
        payload: AppendRequest,
    ) -> Result<SubmissionOutcome, SubmitError> {
        if let Some(user) = self.session.current().await {
            if !user.role.can_submit() {
                return Err(SubmitError::AccessDenied);
            }
        }
        let outcome = self.queue.submit(payload).await?;
        if outcome == SubmissionOutcome::Delivered {
            // New rows exist remotely; refresh dependent read models.
            self.refresh().await;
        }
        Ok(outcome)
    }

    /// Fetch a snapshot and reconcile notifications and settings against it.
    ///
    /// Offline or failed fetches leave the current feed untouched.
    pub async fn refresh(&self) -> Option<Vec<AlertRecord>> {
        if !self.connectivity.is_online() {
            return None;
        }
        match self.gateway.fetch_all().await {
            Ok(snapshot) => {
                self.settings.apply_snapshot(&snapshot).await;
                let user = self.session.current().await;
                Some(self.notifications.reconcile(&snapshot, user.as_ref()).await)
            }
            Err(err) => {
                tracing::warn!(%err, "snapshot fetch failed; keeping cached feed");
                None
            }
        }
    }

    pub async fn mark_read(&self, id: &AlertId) -> Option<ModuleTarget> {
        let role = self.session.current().await.map(|user| user.role);
        self.notifications.mark_read(id, role).await
    }

    pub async fn dismiss(&self, id: &AlertId) {
        self.notifications.dismiss(id).await;
    }

    /// Globally acknowledge a derived issue. Requires connectivity; an
    /// offline acknowledgement is refused rather than queued.
    pub async fn acknowledge(&self, id: &AlertId) {
        if !self.connectivity.is_online() {
            return;
        }
        let user = self.session.current().await;
        self.notifications
            .acknowledge_globally(id, user.as_ref())
            .await;
    }
}
