//! Normalized alert records and their identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::severity::Severity;
use crate::sheet::SheetKind;

/// Identifier of the synthetic "system online" alert.
///
/// Versioned so a future copy change can resurface it for users who dismissed
/// the old one.
pub const SYSTEM_ONLINE_ALERT_ID: &str = "sys_online_v1";

/// Who owns the authoritative read/dismiss state for an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Synthesized client-side from inspection rating data.
    Derived,
    /// Authored on the backend (`SystemNotification` table); read state is
    /// server-owned.
    Server,
    /// Generated locally with no backing row (e.g. the system-online notice).
    Synthetic,
}

/// Identity of an alert across fetches.
///
/// Id spaces are disjoint by construction: derived ids embed the sheet name
/// and row content, server ids come from the backend's id column, and
/// synthetic ids use fixed `sys_` names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(String);

impl AlertId {
    /// Deterministic id for a derived alert.
    ///
    /// A pure function of (sheet, row timestamp, vehicle registration), so
    /// repeated fetches of the same underlying row always map to the same id.
    /// Whitespace in the vehicle registration is stripped because the sheet
    /// data is hand-entered and spacing is not stable.
    pub fn derived(sheet: SheetKind, timestamp: DateTime<Utc>, vehicle: &str) -> Self {
        let vehicle: String = vehicle.split_whitespace().collect();
        Self(format!(
            "{}_{}_{}",
            sheet.table_name(),
            timestamp.timestamp_millis(),
            vehicle
        ))
    }

    /// Id assigned by the backend for a server-authored alert.
    pub fn server(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The synthetic system-online alert id.
    pub fn system_online() -> Self {
        Self(SYSTEM_ONLINE_ALERT_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AlertId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AlertId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AlertId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A normalized notification, regardless of source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: AlertId,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    pub provenance: Provenance,
    /// Inspection module this alert relates to (table name), if any.
    pub module: Option<String>,
    /// Navigation hint from a server-authored alert, e.g. `view:petroleum`.
    pub action_link: Option<String>,
    /// Recipient targeting of a server-authored alert (username, role or
    /// `all`).
    pub recipient: Option<String>,
}

impl AlertRecord {
    pub fn is_server_event(&self) -> bool {
        self.provenance == Provenance::Server
    }
}
