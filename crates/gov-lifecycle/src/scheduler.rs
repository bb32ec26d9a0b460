//! The scheduler loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use gov_engine::{GovernanceService, GovernanceStore};
use shared_store::StoreError;
use shared_types::{Proposal, SYSTEM_ACTOR};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::config::LifecycleConfig;

/// Counters exposed by the scheduler.
#[derive(Debug, Default)]
pub struct SchedulerStats {
    /// Proposals this loop moved from Draft to Open.
    pub proposals_opened: AtomicU64,
    /// Proposals this loop moved from Open to Closed.
    pub proposals_closed: AtomicU64,
    /// Candidates rejected by governance rules (stale batch rows).
    pub transitions_skipped: AtomicU64,
    /// Store failures; the affected candidates retry on the next tick.
    pub store_errors: AtomicU64,
}

/// Advances time-scheduled proposals through the governance engine.
///
/// One instance runs per process. The loop is purely a driver: every
/// candidate it finds is handed to [`GovernanceService`], which
/// re-fetches and re-validates before persisting, so a candidate that
/// another caller already advanced is rejected there and counted as a
/// skip rather than double-processed.
pub struct LifecycleScheduler<S> {
    store: Arc<S>,
    service: Arc<GovernanceService<S>>,
    config: LifecycleConfig,
    stats: Arc<SchedulerStats>,
}

impl<S: GovernanceStore> LifecycleScheduler<S> {
    /// Creates a scheduler over the given store and command service.
    pub fn new(
        store: Arc<S>,
        service: Arc<GovernanceService<S>>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            store,
            service,
            config,
            stats: Arc::new(SchedulerStats::default()),
        }
    }

    /// Shared handle to the loop's counters.
    pub fn stats(&self) -> Arc<SchedulerStats> {
        Arc::clone(&self.stats)
    }

    /// Runs until the shutdown channel flips.
    ///
    /// A transition in flight always completes its persist step; the
    /// shutdown flag is honored between candidates and between ticks.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            batch_size = self.config.batch_size,
            "lifecycle scheduler started"
        );
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick(Utc::now(), &shutdown).await;
                }
                _ = shutdown.changed() => {
                    info!("lifecycle scheduler stopped");
                    return;
                }
            }
        }
    }

    /// One scheduling pass: open everything due to open, then close
    /// everything due to close, one bounded batch per direction.
    pub async fn tick(&self, now: DateTime<Utc>, shutdown: &watch::Receiver<bool>) {
        let due_to_open =
            self.unwrap_batch(self.store.list_due_to_open(now, self.config.batch_size).await);
        for proposal in due_to_open {
            if *shutdown.borrow() {
                return;
            }
            self.transition(&proposal, now, Direction::Open).await;
        }

        let due_to_close =
            self.unwrap_batch(self.store.list_due_to_close(now, self.config.batch_size).await);
        for proposal in due_to_close {
            if *shutdown.borrow() {
                return;
            }
            self.transition(&proposal, now, Direction::Close).await;
        }
    }

    fn unwrap_batch(&self, batch: Result<Vec<Proposal>, StoreError>) -> Vec<Proposal> {
        match batch {
            Ok(batch) => batch,
            Err(error) => {
                error!(%error, "due-proposal query failed; retrying next tick");
                self.stats.store_errors.fetch_add(1, Ordering::Relaxed);
                Vec::new()
            }
        }
    }

    async fn transition(&self, proposal: &Proposal, now: DateTime<Utc>, direction: Direction) {
        let outcome = match direction {
            Direction::Open => {
                self.service
                    .open_proposal(proposal.id, Some(SYSTEM_ACTOR), now)
                    .await
            }
            Direction::Close => {
                self.service
                    .close_proposal(proposal.id, Some(SYSTEM_ACTOR), now)
                    .await
            }
        };

        match outcome {
            Ok(_) => {
                let counter = match direction {
                    Direction::Open => &self.stats.proposals_opened,
                    Direction::Close => &self.stats.proposals_closed,
                };
                counter.fetch_add(1, Ordering::Relaxed);
            }
            Err(error) if error.is_validation() => {
                // Stale candidate: someone advanced it after the batch
                // query. The engine's re-validation is the arbiter.
                warn!(
                    proposal_id = %proposal.id,
                    %error,
                    "skipping proposal that can no longer transition"
                );
                self.stats.transitions_skipped.fetch_add(1, Ordering::Relaxed);
            }
            Err(error) => {
                error!(
                    proposal_id = %proposal.id,
                    %error,
                    "transition failed on store error; retrying next tick"
                );
                self.stats.store_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Open,
    Close,
}
