//! The purge loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDate, Utc};
use shared_store::{AuditEventStore, StoreError};
use shared_types::{AuditAction, AuditEvent, SYSTEM_ACTOR};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::RetentionConfig;
use crate::schedule::PurgeSchedule;

/// Result of one completed purge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeOutcome {
    /// Rows deleted across all passes.
    pub deleted: u64,
    /// Passes that deleted at least one row.
    pub passes: u32,
    /// Events with a timestamp strictly before this were in scope.
    pub cutoff: DateTime<Utc>,
    /// Wall-clock time the purge took.
    pub duration: Duration,
}

/// Deletes audit events older than the retention window, once per day.
///
/// The loop wakes on a coarse interval and asks the schedule whether a
/// purge is due. The due date is stamped when a purge is attempted, not
/// when it succeeds: a purge aborted by a store error retries on the next
/// scheduled day rather than hammering a struggling store every wakeup,
/// and the rows it missed simply age one more day.
pub struct RetentionPurger<S> {
    store: Arc<S>,
    config: RetentionConfig,
    schedule: PurgeSchedule,
}

impl<S: AuditEventStore> RetentionPurger<S> {
    /// Creates a purger over the given store.
    ///
    /// The schedule string must already be validated; parse failures are
    /// configuration errors surfaced at startup.
    pub fn new(store: Arc<S>, config: RetentionConfig, schedule: PurgeSchedule) -> Self {
        Self {
            store,
            config,
            schedule,
        }
    }

    /// Runs until the shutdown channel flips.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            retention_days = self.config.retention_days,
            hour = self.schedule.hour(),
            minute = self.schedule.minute(),
            check_interval_secs = self.config.check_interval.as_secs(),
            "retention purger started"
        );
        let mut ticker = tokio::time::interval(self.config.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_run: Option<NaiveDate> = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = Utc::now();
                    if !self.schedule.is_due(now, last_run) {
                        continue;
                    }
                    last_run = Some(now.date_naive());
                    match self.run_purge(now, &shutdown).await {
                        Ok(outcome) => {
                            info!(
                                deleted = outcome.deleted,
                                passes = outcome.passes,
                                cutoff = %outcome.cutoff,
                                duration_ms = outcome.duration.as_millis() as u64,
                                "audit retention purge finished"
                            );
                        }
                        Err(purge_error) => {
                            error!(
                                %purge_error,
                                "audit retention purge aborted; next attempt tomorrow"
                            );
                        }
                    }
                }
                _ = shutdown.changed() => {
                    info!("retention purger stopped");
                    return;
                }
            }
        }
    }

    /// One full purge: delete batches until a pass removes nothing, then
    /// record the summary audit event.
    ///
    /// The shutdown flag is honored between passes; a delete statement in
    /// flight always completes. A store error aborts the run and leaves
    /// the remaining rows for the next scheduled purge.
    pub async fn run_purge(
        &self,
        now: DateTime<Utc>,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<PurgeOutcome, StoreError> {
        let cutoff = now - chrono::Duration::days(i64::from(self.config.retention_days));
        let started = Instant::now();
        let mut deleted_total: u64 = 0;
        let mut passes: u32 = 0;

        info!(
            %cutoff,
            retention_days = self.config.retention_days,
            batch_size = self.config.batch_size,
            "audit retention purge started"
        );

        loop {
            if *shutdown.borrow() {
                info!(deleted_total, "retention purge interrupted by shutdown");
                break;
            }
            let deleted = self
                .store
                .delete_older_than(cutoff, self.config.batch_size)
                .await?;
            if deleted == 0 {
                break;
            }
            passes += 1;
            deleted_total += deleted;
            debug!(deleted, passes, "retention purge pass completed");
            tokio::time::sleep(self.config.batch_delay).await;
        }

        let duration = started.elapsed();
        self.record_summary(deleted_total, cutoff, duration, now).await;

        Ok(PurgeOutcome {
            deleted: deleted_total,
            passes,
            cutoff,
            duration,
        })
    }

    /// The purge audits itself. A failure here is logged and swallowed:
    /// the deletions already happened and a missing summary row must not
    /// fail the purge that performed them.
    async fn record_summary(
        &self,
        deleted: u64,
        cutoff: DateTime<Utc>,
        duration: Duration,
        now: DateTime<Utc>,
    ) {
        let summary = AuditEvent::new(AuditAction::Deleted, "AuditEvent", "retention-purge", now)
            .with_actor(SYSTEM_ACTOR)
            .with_details(serde_json::json!({
                "deletedCount": deleted,
                "cutoffDate": cutoff,
                "durationSeconds": duration.as_secs_f64(),
            }));
        if let Err(store_error) = self.store.insert_batch(&[summary]).await {
            warn!(
                %store_error,
                deleted,
                "failed to record retention purge summary audit event"
            );
        }
    }
}
