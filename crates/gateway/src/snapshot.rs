//! Parsed table snapshot from the `GET` endpoint.
//!
//! The backend answers with one JSON object keyed by table name. Most tables
//! are positional row arrays (row 0 = header); `Validation_Data` is an object
//! of known-value lists. Individual tables are decoded lazily so one
//! malformed table never aborts processing of the others.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use safetycheck_core::sheet::{
    ACKNOWLEDGEMENTS_TABLE, SYSTEM_NOTIFICATION_TABLE, SYSTEM_SETTINGS_TABLE,
    VALIDATION_DATA_TABLE,
};

use crate::GatewayError;

/// A snapshot of every backend table at one fetch.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    tables: BTreeMap<String, Value>,
}

impl Snapshot {
    pub fn from_value(value: Value) -> Result<Self, GatewayError> {
        match value {
            Value::Object(map) => Ok(Self {
                tables: map.into_iter().collect(),
            }),
            other => Err(GatewayError::Parse(format!(
                "snapshot root must be an object, got {other}"
            ))),
        }
    }

    /// All rows of a table including its header row.
    ///
    /// A missing or malformed table yields no rows for this cycle; other
    /// tables are unaffected.
    pub fn rows(&self, name: &str) -> Vec<Vec<Value>> {
        let Some(value) = self.tables.get(name) else {
            return Vec::new();
        };
        match serde_json::from_value::<Vec<Vec<Value>>>(value.clone()) {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(table = name, %err, "skipping malformed table in snapshot");
                Vec::new()
            }
        }
    }

    /// Data rows of a table (header row excluded).
    pub fn data_rows(&self, name: &str) -> Vec<Vec<Value>> {
        let mut rows = self.rows(name);
        if rows.len() <= 1 {
            return Vec::new();
        }
        rows.remove(0);
        rows
    }

    /// Ids in the global `Acknowledgements` table.
    ///
    /// The backend has served this both as a flat string array and as
    /// positional rows; accept either, taking the first cell of row-shaped
    /// entries.
    pub fn acknowledged_ids(&self) -> HashSet<String> {
        let Some(Value::Array(entries)) = self.tables.get(ACKNOWLEDGEMENTS_TABLE) else {
            return HashSet::new();
        };
        entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(id) => Some(id.clone()),
                Value::Array(cells) => cells.first().and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect()
    }

    /// Server-authored notification rows, with unparseable rows dropped.
    pub fn server_notifications(&self) -> Vec<ServerNotificationRow> {
        self.data_rows(SYSTEM_NOTIFICATION_TABLE)
            .iter()
            .filter_map(|row| ServerNotificationRow::from_row(row))
            .collect()
    }

    /// The latest settings row (`System_Settings`, last row wins).
    pub fn latest_settings_row(&self) -> Option<Vec<Value>> {
        self.data_rows(SYSTEM_SETTINGS_TABLE).pop()
    }

    /// Autocomplete validation lists.
    pub fn validation_lists(&self) -> ValidationLists {
        let Some(value) = self.tables.get(VALIDATION_DATA_TABLE) else {
            return ValidationLists::default();
        };
        match serde_json::from_value(value.clone()) {
            Ok(lists) => lists,
            Err(err) => {
                tracing::warn!(%err, "skipping malformed validation lists in snapshot");
                ValidationLists::default()
            }
        }
    }

    /// Map a sheet's data rows against its header list, newest first.
    pub fn history_records(
        &self,
        sheet: &str,
        headers: &[String],
    ) -> Vec<serde_json::Map<String, Value>> {
        let mut records: Vec<_> = self
            .data_rows(sheet)
            .into_iter()
            .map(|row| {
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, header)| {
                        (header.clone(), row.get(i).cloned().unwrap_or(Value::Null))
                    })
                    .collect()
            })
            .collect();
        records.reverse();
        records
    }
}

/// One row of the `SystemNotification` table.
///
/// Columns: ID(0), Recipient(1), Type(2), Message(3), Date(4), IsRead(5),
/// ActionLink(6).
#[derive(Debug, Clone)]
pub struct ServerNotificationRow {
    pub id: String,
    pub recipient: String,
    pub severity_raw: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read_on_server: bool,
    pub action_link: Option<String>,
}

impl ServerNotificationRow {
    fn from_row(row: &[Value]) -> Option<Self> {
        let id = cell_string(row, 0)?;
        if id.is_empty() {
            return None;
        }
        Some(Self {
            id,
            recipient: cell_string(row, 1).unwrap_or_default(),
            severity_raw: cell_string(row, 2).unwrap_or_default(),
            message: cell_string(row, 3).unwrap_or_default(),
            timestamp: cell_timestamp(row, 4)?,
            read_on_server: cell_string(row, 5)
                .map(|raw| raw.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            action_link: cell_string(row, 6).filter(|link| !link.is_empty()),
        })
    }
}

/// Known distinct values for autocomplete fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationLists {
    #[serde(default, rename = "Truck_Reg_No")]
    pub trucks: Vec<String>,
    #[serde(default, rename = "Trailer_Reg_No")]
    pub trailers: Vec<String>,
    #[serde(default, rename = "Driver_Name")]
    pub drivers: Vec<String>,
    #[serde(default, rename = "Inspector_Name")]
    pub inspectors: Vec<String>,
    #[serde(default, rename = "Location")]
    pub locations: Vec<String>,
    #[serde(default, rename = "Position")]
    pub positions: Vec<String>,
}

/// Read a cell as a string, stringifying numbers and booleans.
pub fn cell_string(row: &[Value], index: usize) -> Option<String> {
    match row.get(index)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a cell as an integer, accepting numeric strings.
pub fn cell_i64(row: &[Value], index: usize) -> Option<i64> {
    match row.get(index)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    }
}

/// Read a cell as a timestamp.
///
/// Sheet cells come back either as RFC 3339 strings, bare
/// `YYYY-MM-DD HH:MM:SS` strings, or epoch milliseconds.
pub fn cell_timestamp(row: &[Value], index: usize) -> Option<DateTime<Utc>> {
    match row.get(index)? {
        Value::String(raw) => parse_timestamp(raw),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    None
}
