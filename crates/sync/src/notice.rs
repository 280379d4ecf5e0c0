//! User-facing notices (toasts).
//!
//! The sync pipeline never blocks on the UI; it emits notices over an
//! unbounded channel the presentation layer may or may not be draining.

use safetycheck_core::Severity;
use tokio::sync::mpsc;

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Info,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn back_online() -> Self {
        Self::info("Back Online! Attempting to sync...")
    }

    pub fn offline_saved() -> Self {
        Self::info("Offline Mode: Report Saved. Will sync when online.")
    }

    pub fn queued_after_error() -> Self {
        Self::info("Network Error: Report queued for sync.")
    }

    pub fn synced(count: usize) -> Self {
        Self::success(format!("Synced {count} offline records successfully!"))
    }

    pub fn acknowledged() -> Self {
        Self::success("Issue Resolved & Acknowledged Globally.")
    }
}

/// Best-effort notice publisher.
///
/// A disabled sink (no UI attached) drops everything silently; a closed
/// receiver is likewise not an error.
#[derive(Debug, Clone, Default)]
pub struct NoticeSink {
    tx: Option<mpsc::UnboundedSender<Notice>>,
}

impl NoticeSink {
    /// A sink that drops all notices.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// A sink paired with a receiver for the presentation layer.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn emit(&self, notice: Notice) {
        tracing::debug!(message = %notice.message, severity = %notice.severity, "notice");
        if let Some(tx) = &self.tx {
            let _ = tx.send(notice);
        }
    }
}
