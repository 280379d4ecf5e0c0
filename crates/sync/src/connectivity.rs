//! Connectivity state tracking.
//!
//! The monitor trusts the platform-level online signal: it never probes or
//! retries itself. Transitions are broadcast over a watch channel so the
//! sync service can react to offline→online edges.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Connectivity state of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    Online,
    Offline,
}

/// Process-wide online/offline flag with transition events.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    online: AtomicBool,
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    /// Initialize from the platform's online indicator at startup.
    pub fn new(initially_online: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_online);
        Self {
            online: AtomicBool::new(initially_online),
            tx,
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> ConnectivityState {
        if self.is_online() {
            ConnectivityState::Online
        } else {
            ConnectivityState::Offline
        }
    }

    /// Record a platform connectivity change.
    ///
    /// Returns `true` only on an actual transition; repeated signals with the
    /// same value are no-ops and wake no subscribers.
    pub fn set_online(&self, online: bool) -> bool {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous == online {
            return false;
        }
        tracing::info!(online, "connectivity changed");
        self.tx.send_replace(online);
        true
    }

    /// Subscribe to transition events. The received value is the new online
    /// flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}
