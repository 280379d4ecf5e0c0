//! Offline-first submission queue.
//!
//! Every finalized inspection record eventually reaches the remote store:
//! a record is either delivered immediately or appended to a durable FIFO
//! queue, and the queue is drained strictly in order on reconnection. The
//! persisted queue is rewritten after **every** successful removal, never
//! batched, so a crash mid-flush loses nothing that was already delivered.
//!
//! Failure policy is head-of-line: the first item that fails to send stops
//! the whole flush, because table-append order matters to downstream
//! consumers of the sheet. There is no retry cap and no backoff beyond a
//! fixed inter-item courtesy delay.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;

use safetycheck_gateway::{AppendRequest, Gateway};
use safetycheck_store::{LocalStore, keys};

use crate::connectivity::ConnectivityMonitor;
use crate::notice::{Notice, NoticeSink};

/// Inter-item delay while draining, to be gentle on the endpoint.
const FLUSH_DELAY: Duration = Duration::from_millis(500);

/// Result of a `submit` call. Both outcomes mean the record is safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The remote append went through on the spot.
    Delivered,
    /// The record is persisted locally and will sync later.
    Queued,
}

/// What a flush accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub delivered: usize,
    pub remaining: usize,
}

/// Rejected submission. Only preconditions fail; transport trouble always
/// degrades to [`SubmissionOutcome::Queued`] instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("invalid submission: {0}")]
    Invalid(String),
    /// The session's role is view-only.
    #[error("access denied: view-only account")]
    AccessDenied,
}

/// Durable FIFO queue of pending append payloads.
pub struct OfflineQueue<S, G> {
    store: Arc<S>,
    gateway: Arc<G>,
    connectivity: Arc<ConnectivityMonitor>,
    notices: NoticeSink,
    /// In-memory mirror of the persisted queue. Updated only after the
    /// persisted write has completed.
    items: Mutex<Vec<AppendRequest>>,
    flushing: AtomicBool,
    flush_delay: Duration,
}

impl<S: LocalStore, G: Gateway> OfflineQueue<S, G> {
    /// Load the queue, restoring any submissions persisted by a previous
    /// process.
    pub async fn load(
        store: Arc<S>,
        gateway: Arc<G>,
        connectivity: Arc<ConnectivityMonitor>,
        notices: NoticeSink,
    ) -> Self {
        let items = match store.get_json::<Vec<AppendRequest>>(keys::OFFLINE_QUEUE).await {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(%err, "failed to restore offline queue; starting empty");
                Vec::new()
            }
        };
        if !items.is_empty() {
            tracing::info!(pending = items.len(), "restored offline queue");
        }
        Self {
            store,
            gateway,
            connectivity,
            notices,
            items: Mutex::new(items),
            flushing: AtomicBool::new(false),
            flush_delay: FLUSH_DELAY,
        }
    }

    /// Override the inter-item flush delay (tests).
    pub fn with_flush_delay(mut self, delay: Duration) -> Self {
        self.flush_delay = delay;
        self
    }

    pub async fn pending(&self) -> Vec<AppendRequest> {
        self.items.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }

    /// Submit a finalized record: deliver now if possible, queue otherwise.
    ///
    /// The payload is never lost — every return path has either delivered it
    /// or persisted it.
    pub async fn submit(&self, payload: AppendRequest) -> Result<SubmissionOutcome, SubmitError> {
        if payload.id.trim().is_empty() {
            return Err(SubmitError::Invalid("record id must not be empty".into()));
        }
        if payload.sheet.trim().is_empty() {
            return Err(SubmitError::Invalid("target sheet must not be empty".into()));
        }

        if !self.connectivity.is_online() {
            self.enqueue(payload).await;
            self.notices.emit(Notice::offline_saved());
            return Ok(SubmissionOutcome::Queued);
        }

        match self.gateway.append(&payload).await {
            Ok(()) => {
                tracing::info!(sheet = %payload.sheet, id = %payload.id, "record delivered");
                Ok(SubmissionOutcome::Delivered)
            }
            Err(err) => {
                tracing::warn!(sheet = %payload.sheet, id = %payload.id, %err,
                    "direct submit failed; queueing");
                self.enqueue(payload).await;
                self.notices.emit(Notice::queued_after_error());
                Ok(SubmissionOutcome::Queued)
            }
        }
    }

    /// Drain the queue head-first. Safe to call anytime: an empty queue, an
    /// offline client or an already-running flush all no-op.
    pub async fn flush(&self) -> FlushReport {
        if !self.connectivity.is_online() {
            return FlushReport {
                delivered: 0,
                remaining: self.len().await,
            };
        }

        // At most one flush at a time; overlapping triggers must not
        // interleave removals.
        if self
            .flushing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return FlushReport {
                delivered: 0,
                remaining: self.len().await,
            };
        }
        let _guard = FlushGuard(&self.flushing);

        let mut delivered = 0usize;
        loop {
            // Only this task removes items, so the head is stable while the
            // lock is released for the remote call.
            let Some(head) = self.items.lock().await.first().cloned() else {
                break;
            };

            match self.gateway.append(&head).await {
                Ok(()) => {
                    self.remove_head(&head).await;
                    delivered += 1;
                    tracing::info!(sheet = %head.sheet, id = %head.id, "queued record synced");
                    if !self.is_empty().await {
                        tokio::time::sleep(self.flush_delay).await;
                    }
                }
                Err(err) => {
                    // Head-of-line: leave the failed item and everything
                    // behind it, in original order.
                    tracing::warn!(sheet = %head.sheet, id = %head.id, %err,
                        "flush stopped at failing item");
                    break;
                }
            }
        }

        let remaining = self.len().await;
        if delivered > 0 {
            self.notices.emit(Notice::synced(delivered));
        }
        FlushReport {
            delivered,
            remaining,
        }
    }

    /// Append to the tail: read, compute, persist, then update memory.
    async fn enqueue(&self, payload: AppendRequest) {
        let mut items = self.items.lock().await;
        let mut next = items.clone();
        next.push(payload);
        self.persist(&next).await;
        *items = next;
    }

    /// Remove a delivered head: persist the shortened queue before the
    /// in-memory mirror changes, so termination between the two steps can
    /// only re-send, never lose.
    async fn remove_head(&self, expected: &AppendRequest) {
        let mut items = self.items.lock().await;
        debug_assert_eq!(items.first().map(|i| i.id.as_str()), Some(expected.id.as_str()));
        let next: Vec<AppendRequest> = items.iter().skip(1).cloned().collect();
        self.persist(&next).await;
        *items = next;
    }

    async fn persist(&self, items: &[AppendRequest]) {
        if let Err(err) = self.store.put_json(keys::OFFLINE_QUEUE, &items).await {
            // The in-memory queue still reflects the change for this
            // session; only the persisted copy is stale.
            tracing::error!(%err, "failed to persist offline queue");
        }
    }
}

struct FlushGuard<'a>(&'a AtomicBool);

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
