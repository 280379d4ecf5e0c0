//! Alert severity levels.

use serde::{Deserialize, Serialize};

/// Severity of an alert or user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
    Success,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
            Severity::Success => "success",
        }
    }

    /// Parse a raw cell value, defaulting to `Info` for anything unrecognized.
    ///
    /// Server-authored notification rows carry free-text severity; sheet
    /// data uses lowercase names but this is lenient on case.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "warning" => Severity::Warning,
            "success" => Severity::Success,
            _ => Severity::Info,
        }
    }

    /// Classify an inspection rating (1-5 scale) into an alert severity.
    ///
    /// Ratings of 4 and above are considered passing and produce no alert.
    pub fn from_rating(rating: i64) -> Option<Self> {
        if rating <= 2 {
            Some(Severity::Critical)
        } else if rating == 3 {
            Some(Severity::Warning)
        } else {
            None
        }
    }
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
