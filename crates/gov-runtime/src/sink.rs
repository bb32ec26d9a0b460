//! Bridges the command layer's audit port onto the ingestion pipeline.

use async_trait::async_trait;
use gov_audit::AuditRecorder;
use gov_engine::AuditSink;
use shared_types::AuditEvent;

/// [`AuditSink`] that enqueues onto the audit pipeline.
///
/// The recorder already absorbs backpressure (bounded wait, then drop
/// with a warning), which is exactly the contract the sink promises the
/// command layer.
pub struct RecorderAuditSink {
    recorder: AuditRecorder,
}

impl RecorderAuditSink {
    /// Wraps a pipeline recorder handle.
    pub fn new(recorder: AuditRecorder) -> Self {
        Self { recorder }
    }
}

#[async_trait]
impl AuditSink for RecorderAuditSink {
    async fn record(&self, event: AuditEvent) {
        self.recorder.record(event).await;
    }
}
