//! Users and roles.

use serde::{Deserialize, Serialize};

/// Access role of a logged-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Inspector,
    Operations,
    Maintenance,
    Other,
}

impl Role {
    /// Parse a role as stored in the users sheet.
    ///
    /// Backend rows are hand-maintained, so comparison is case-insensitive
    /// and anything unrecognized falls back to `Inspector`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "operations" => Role::Operations,
            "maintenance" => Role::Maintenance,
            "other" => Role::Other,
            _ => Role::Inspector,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Inspector => "Inspector",
            Role::Operations => "Operations",
            Role::Maintenance => "Maintenance",
            Role::Other => "Other",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Whether this role may submit inspection records.
    ///
    /// Operations/Maintenance/Other accounts are view-only.
    pub fn can_submit(&self) -> bool {
        matches!(self, Role::Admin | Role::Inspector)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logged-in (or cached) user session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
}

impl User {
    /// Whether a server alert's recipient target addresses this user.
    ///
    /// Matches by exact username, by role name, or by the wildcard `all`;
    /// all comparisons are case-insensitive.
    pub fn matches_recipient(&self, target: &str) -> bool {
        let target = target.trim().to_ascii_lowercase();
        target == "all"
            || target == self.username.to_ascii_lowercase()
            || target == self.role.as_str().to_ascii_lowercase()
    }
}
