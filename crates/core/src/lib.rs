//! `safetycheck-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** types for the fleet-safety inspection
//! client: alert identifiers and records, sheet (table) metadata, users/roles
//! and cached settings. No infrastructure concerns live here.

pub mod alert;
pub mod error;
pub mod settings;
pub mod severity;
pub mod sheet;
pub mod user;

pub use alert::{AlertId, AlertRecord, Provenance};
pub use error::{CoreError, CoreResult};
pub use settings::SystemSettings;
pub use severity::Severity;
pub use sheet::SheetKind;
pub use user::{Role, User};
