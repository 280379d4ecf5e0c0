//! `safetycheck-sync` — offline-resilient submission and synchronization.
//!
//! **Responsibility:** the client-side pipeline between finalized inspection
//! forms and the spreadsheet-backed remote store:
//!
//! - [`queue::OfflineQueue`] — durable FIFO of pending submissions; delivers
//!   each record exactly once on the happy path and never drops one on the
//!   failure path.
//! - [`notifications::NotificationCenter`] — merges derived, server-authored
//!   and synthetic alerts into one de-duplicated feed and routes
//!   acknowledgements by provenance.
//! - [`connectivity::ConnectivityMonitor`] — single source of truth for
//!   online/offline state.
//! - [`service::SyncService`] — wires the trigger policy between the three.
//!
//! All operations are cooperative async tasks; there are no threads here and
//! no locks held across remote calls. Nothing in this crate is fatal to the
//! process: the worst case is a stale notification display, never a lost
//! submission.

pub mod connectivity;
pub mod notice;
pub mod notifications;
pub mod queue;
pub mod service;
pub mod session;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;

pub use connectivity::{ConnectivityMonitor, ConnectivityState};
pub use notice::{Notice, NoticeSink};
pub use notifications::{ModuleTarget, NotificationCenter};
pub use queue::{FlushReport, OfflineQueue, SubmissionOutcome, SubmitError};
pub use service::SyncService;
pub use session::{SessionError, SessionManager};
pub use settings::SettingsManager;
