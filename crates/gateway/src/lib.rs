//! `safetycheck-gateway` — thin HTTP client for the tabular backend.
//!
//! **Responsibility:** the observable contract of the spreadsheet-backed
//! endpoint, and nothing more. The backend offers no retries and no
//! transactions; all resilience lives client-side in `safetycheck-sync`.
//!
//! Two request shapes exist:
//! - `GET <endpoint>?t=<cachebuster>` returning every table as JSON
//!   ([`Snapshot`]);
//! - `POST <endpoint>` carrying either a control action ([`Action`]) with a
//!   readable `{status: ...}` ack, or a row append ([`AppendRequest`]) whose
//!   response body is not meaningful — success is assumed unless the
//!   transport itself fails.

pub mod action;
pub mod client;
pub mod snapshot;

use thiserror::Error;

pub use action::{Action, ActionAck, AppendRequest};
pub use client::HttpGateway;
pub use snapshot::{ServerNotificationRow, Snapshot, ValidationLists};

/// Gateway error.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure (unreachable, timeout). Always recoverable:
    /// the queue keeps the item.
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-success HTTP status.
    #[error("backend error ({0}): {1}")]
    Api(u16, String),

    /// A response body could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Remote gateway abstraction.
///
/// `safetycheck-sync` is generic over this trait; tests substitute a scripted
/// implementation.
#[allow(async_fn_in_trait)]
pub trait Gateway: Send + Sync {
    /// Fetch the full table snapshot.
    async fn fetch_all(&self) -> Result<Snapshot, GatewayError>;

    /// Best-effort row append. An `Ok` means the transport delivered the
    /// request; the backend's own verdict is not observable.
    async fn append(&self, request: &AppendRequest) -> Result<(), GatewayError>;

    /// Control action with a readable acknowledgement.
    async fn post_action(&self, action: &Action) -> Result<ActionAck, GatewayError>;
}
