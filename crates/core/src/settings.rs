//! Cached company settings.

use serde::{Deserialize, Serialize};

/// Company-level settings, authored on the backend (`System_Settings` table,
/// last row wins) and cached locally for offline rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSettings {
    pub company_name: String,
    pub manager_email: String,
    /// Base64 data URL for a custom logo. Large, so persisting it can
    /// overflow the local store's quota; callers tolerate that.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_logo: Option<String>,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            company_name: "My Transport Co.".to_string(),
            manager_email: String::new(),
            company_logo: None,
        }
    }
}
