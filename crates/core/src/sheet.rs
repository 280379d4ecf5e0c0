//! Sheet (backend table) metadata.
//!
//! The backend is a spreadsheet: each inspection type is one table whose
//! column schema is fixed and positional. The client writes rows aligned to
//! the authoritative header list and reads them back by position, so the
//! indexes below must never drift from the headers sent on create.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Auxiliary table holding globally acknowledged issue ids.
pub const ACKNOWLEDGEMENTS_TABLE: &str = "Acknowledgements";
/// Auxiliary table holding server-authored notifications.
pub const SYSTEM_NOTIFICATION_TABLE: &str = "SystemNotification";
/// Auxiliary table holding company settings rows (last row wins).
pub const SYSTEM_SETTINGS_TABLE: &str = "System_Settings";
/// Auxiliary table holding autocomplete validation lists.
pub const VALIDATION_DATA_TABLE: &str = "Validation_Data";

/// Header list for `System_Settings` appends.
pub const SETTINGS_HEADERS: [&str; 5] = [
    "Company_Name",
    "Manager_Email",
    "Active_Script_URL",
    "Last_Updated",
    "Company_Logo",
];

/// The four inspection tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SheetKind {
    General,
    Petroleum,
    PetroleumV2,
    Acid,
}

impl SheetKind {
    pub const ALL: [SheetKind; 4] = [
        SheetKind::General,
        SheetKind::Petroleum,
        SheetKind::PetroleumV2,
        SheetKind::Acid,
    ];

    /// The backend table name.
    pub fn table_name(&self) -> &'static str {
        match self {
            SheetKind::General => "General",
            SheetKind::Petroleum => "Petroleum",
            SheetKind::PetroleumV2 => "Petroleum_V2",
            SheetKind::Acid => "Acid",
        }
    }

    pub fn from_table_name(name: &str) -> CoreResult<Self> {
        match name {
            "General" => Ok(SheetKind::General),
            "Petroleum" => Ok(SheetKind::Petroleum),
            "Petroleum_V2" => Ok(SheetKind::PetroleumV2),
            "Acid" => Ok(SheetKind::Acid),
            other => Err(CoreError::validation(format!("unknown sheet: {other}"))),
        }
    }

    /// Column index of the client-generated record id.
    pub fn id_column(&self) -> usize {
        0
    }

    /// Column index of the inspection timestamp.
    pub fn timestamp_column(&self) -> usize {
        1
    }

    /// Column index of the vehicle (truck) registration.
    pub fn vehicle_column(&self) -> usize {
        2
    }

    /// Column index of the 1-5 overall rating.
    ///
    /// The tanker variants carry a `jobCard` column before the shared
    /// metadata block, which shifts the rating one position right.
    pub fn rating_column(&self) -> usize {
        match self {
            SheetKind::General => 8,
            SheetKind::Petroleum | SheetKind::PetroleumV2 | SheetKind::Acid => 9,
        }
    }
}

impl core::fmt::Display for SheetKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.table_name())
    }
}
