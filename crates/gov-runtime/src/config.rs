//! # Runtime Configuration
//!
//! One section per background loop, each owned by the loop's crate. The
//! runtime validates the whole bundle before any loop starts, so a bad
//! retention schedule aborts the process instead of surfacing hours later
//! at the first purge.

use gov_audit::AuditPipelineConfig;
use gov_lifecycle::LifecycleConfig;
use gov_retention::{PurgeSchedule, RetentionConfig, RetentionConfigError, ScheduleError};
use gov_webhook::WebhookConfig;
use thiserror::Error;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Proposal lifecycle scheduler.
    pub lifecycle: LifecycleConfig,
    /// Audit ingestion pipeline.
    pub audit: AuditPipelineConfig,
    /// Audit retention purger.
    pub retention: RetentionConfig,
    /// Webhook dispatcher.
    pub webhook: WebhookConfig,
}

impl RuntimeConfig {
    /// Rejects configurations no loop should start with.
    pub fn validate(&self) -> Result<(), RuntimeConfigError> {
        if self.audit.queue_capacity == 0 {
            return Err(RuntimeConfigError::ZeroAuditQueue);
        }
        if self.webhook.max_retries == 0 {
            return Err(RuntimeConfigError::ZeroWebhookRetries);
        }
        self.retention.validate()?;
        PurgeSchedule::parse(&self.retention.schedule)?;
        Ok(())
    }
}

/// A configuration the runtime refuses to start with.
#[derive(Debug, Error)]
pub enum RuntimeConfigError {
    /// The retention section failed its own validation.
    #[error("retention: {0}")]
    Retention(#[from] RetentionConfigError),

    /// The purge schedule string does not parse.
    #[error("retention schedule: {0}")]
    Schedule(#[from] ScheduleError),

    /// The audit queue must hold at least one event.
    #[error("audit queue_capacity must be at least 1")]
    ZeroAuditQueue,

    /// Webhooks need at least one delivery attempt.
    #[error("webhook max_retries must be at least 1")]
    ZeroWebhookRetries,
}
