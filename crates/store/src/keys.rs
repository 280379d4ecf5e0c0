//! Namespaced key constants for the local store.
//!
//! The queue, notification state and cached session/settings each own their
//! keys exclusively; no two components write the same key.

/// Pending-submission queue (JSON array of append payloads).
pub const OFFLINE_QUEUE: &str = "safetycheck.offline_queue";

/// Ids of derived/synthetic alerts the user has read (JSON array).
pub const READ_ALERTS: &str = "safetycheck.read_alerts";

/// Ids of derived/synthetic alerts the user has dismissed (JSON array).
pub const DISMISSED_ALERTS: &str = "safetycheck.dismissed_alerts";

/// Cached session user (JSON object).
pub const SESSION_USER: &str = "safetycheck.user";

/// Cached company settings (JSON object).
pub const SETTINGS: &str = "safetycheck.settings";

/// Cached backend endpoint URL (JSON string).
pub const ENDPOINT_URL: &str = "safetycheck.endpoint_url";
