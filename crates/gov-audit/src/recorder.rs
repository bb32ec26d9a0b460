//! Producer half of the pipeline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use shared_types::AuditEvent;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};
use tracing::warn;

/// Counters exposed by the pipeline. Shared by both halves.
#[derive(Debug, Default)]
pub struct PipelineStats {
    /// Events accepted into the queue.
    pub events_enqueued: AtomicU64,
    /// Events dropped at the producer because the queue stayed full past
    /// the enqueue timeout (or the consumer was gone).
    pub events_dropped: AtomicU64,
    /// Events persisted to the store.
    pub events_persisted: AtomicU64,
    /// Batches written to the store.
    pub batches_flushed: AtomicU64,
    /// Batches diverted to fallback files.
    pub fallback_batches: AtomicU64,
    /// Events lost because the store and the fallback write both failed.
    pub events_lost: AtomicU64,
}

/// Cloneable producer handle. One lives inside every component that
/// records audit events.
///
/// `record` never returns an error and never blocks longer than the
/// configured enqueue timeout; audit delivery is best-effort by contract
/// and a full queue sheds load here rather than stalling the caller.
#[derive(Clone)]
pub struct AuditRecorder {
    tx: mpsc::Sender<AuditEvent>,
    enqueue_timeout: Duration,
    stats: Arc<PipelineStats>,
}

impl AuditRecorder {
    pub(crate) fn new(
        tx: mpsc::Sender<AuditEvent>,
        enqueue_timeout: Duration,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            tx,
            enqueue_timeout,
            stats,
        }
    }

    /// Shared handle to the pipeline's counters.
    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    /// Enqueues one audit event.
    ///
    /// Fast path is a lock-free `try_send`. On a full queue the call
    /// waits up to the enqueue timeout for space, then drops the event
    /// with a warning and counts it.
    pub async fn record(&self, event: AuditEvent) {
        let event = match self.tx.try_send(event) {
            Ok(()) => {
                self.stats.events_enqueued.fetch_add(1, Ordering::Relaxed);
                return;
            }
            Err(TrySendError::Full(event)) => event,
            Err(TrySendError::Closed(event)) => {
                self.drop_event(&event, "audit pipeline is shut down");
                return;
            }
        };

        match self.tx.send_timeout(event, self.enqueue_timeout).await {
            Ok(()) => {
                self.stats.events_enqueued.fetch_add(1, Ordering::Relaxed);
            }
            Err(SendTimeoutError::Timeout(event)) => {
                self.drop_event(&event, "audit queue stayed full past the enqueue timeout");
            }
            Err(SendTimeoutError::Closed(event)) => {
                self.drop_event(&event, "audit pipeline is shut down");
            }
        }
    }

    fn drop_event(&self, event: &AuditEvent, reason: &str) {
        warn!(
            event_id = %event.id,
            action = %event.action,
            resource_type = %event.resource_type,
            resource_id = %event.resource_id,
            reason,
            "dropping audit event"
        );
        self.stats.events_dropped.fetch_add(1, Ordering::Relaxed);
    }
}
