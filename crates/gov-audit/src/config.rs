//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Tuning for the audit ingestion pipeline.
#[derive(Debug, Clone)]
pub struct AuditPipelineConfig {
    /// Bounded queue depth between producers and the consumer.
    pub queue_capacity: usize,
    /// Flush once this many events have accumulated.
    pub batch_size: usize,
    /// Flush once the oldest unflushed event has waited this long.
    pub flush_interval: Duration,
    /// How long a producer may wait on a full queue before the event is
    /// dropped. This bounds the worst-case stall on the request path.
    pub enqueue_timeout: Duration,
    /// Directory for fallback files written when the store rejects a
    /// batch. Created on first use.
    pub fallback_dir: PathBuf,
}

impl Default for AuditPipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 10_000,
            batch_size: 100,
            flush_interval: Duration::from_millis(1000),
            enqueue_timeout: Duration::from_millis(100),
            fallback_dir: PathBuf::from("audit-fallback"),
        }
    }
}
