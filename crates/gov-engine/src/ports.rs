//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the command layer requires from the host, beyond the
//! store ports it takes from `shared-store`.

use async_trait::async_trait;
use shared_types::AuditEvent;

/// Where the engine hands off audit events.
///
/// Recording is fire-and-forget by contract: implementations absorb
/// backpressure and failure themselves (the audit pipeline queues, falls
/// back to file, or drops with a warning) so the request path never fails
/// because auditing is degraded.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Enqueue one audit event. Must not block beyond a bounded wait.
    async fn record(&self, event: AuditEvent);
}

/// Sink that discards everything. For hosts that run without auditing.
#[derive(Debug, Default)]
pub struct NullAuditSink;

#[async_trait]
impl AuditSink for NullAuditSink {
    async fn record(&self, _event: AuditEvent) {}
}
