//! # Audit Ingestion Pipeline
//!
//! Decouples audit writes from the request path. Producers hand events to
//! a cloneable [`AuditRecorder`], which pushes them into a bounded queue;
//! a single [`AuditIngestor`] drains the queue and persists events in
//! batches, by size or by age, whichever comes first.
//!
//! ## Degradation ladder
//!
//! Auditing never fails a caller. Under pressure the pipeline degrades in
//! three explicit steps:
//!
//! 1. Queue full: the producer waits a bounded moment, then drops the
//!    event with a warning.
//! 2. Store down: the consumer diverts the whole batch to a timestamped
//!    JSON fallback file for later replay.
//! 3. Store and filesystem both down: the batch is logged (first few
//!    events verbatim, the rest as a count) and dropped.
//!
//! Every step is counted in [`PipelineStats`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod fallback;
pub mod ingestor;
pub mod recorder;

use std::sync::Arc;

use shared_store::AuditEventStore;
use tokio::sync::mpsc;

pub use config::AuditPipelineConfig;
pub use fallback::FallbackError;
pub use ingestor::AuditIngestor;
pub use recorder::{AuditRecorder, PipelineStats};

/// Builds a connected producer/consumer pair over one bounded queue.
///
/// Clone the recorder freely; run the ingestor exactly once. Both ends
/// share the returned recorder's [`PipelineStats`].
pub fn pipeline<S: AuditEventStore>(
    config: AuditPipelineConfig,
    store: Arc<S>,
) -> (AuditRecorder, AuditIngestor<S>) {
    let (tx, rx) = mpsc::channel(config.queue_capacity);
    let stats = Arc::new(PipelineStats::default());
    let recorder = AuditRecorder::new(tx, config.enqueue_timeout, Arc::clone(&stats));
    let ingestor = AuditIngestor::new(rx, store, config, stats);
    (recorder, ingestor)
}
