//! Consumer half of the pipeline.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use shared_store::AuditEventStore;
use shared_types::AuditEvent;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::AuditPipelineConfig;
use crate::fallback;
use crate::recorder::PipelineStats;

/// How many lost events are logged verbatim when a batch cannot be saved
/// anywhere; the rest are summarized as a count.
const LOST_EVENT_LOG_LIMIT: usize = 5;

/// Single consumer of the audit queue.
///
/// Events are appended to an in-memory batch that flushes when it reaches
/// the configured size or when the oldest event in it has waited out the
/// flush interval, whichever happens first. The deadline is armed when
/// the first event of a batch arrives, so a trickle of singleton events
/// still lands within one interval of being recorded.
pub struct AuditIngestor<S> {
    rx: mpsc::Receiver<AuditEvent>,
    store: Arc<S>,
    config: AuditPipelineConfig,
    stats: Arc<PipelineStats>,
}

impl<S: AuditEventStore> AuditIngestor<S> {
    pub(crate) fn new(
        rx: mpsc::Receiver<AuditEvent>,
        store: Arc<S>,
        config: AuditPipelineConfig,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            rx,
            store,
            config,
            stats,
        }
    }

    /// Runs until the shutdown channel flips or every producer is gone.
    ///
    /// On shutdown the queue is drained of everything already enqueued
    /// and the final partial batch is flushed before returning, so an
    /// orderly stop loses nothing that made it into the queue.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            batch_size = self.config.batch_size,
            flush_interval_ms = self.config.flush_interval.as_millis() as u64,
            fallback_dir = %self.config.fallback_dir.display(),
            "audit ingestor started"
        );

        let mut batch: Vec<AuditEvent> = Vec::with_capacity(self.config.batch_size);
        let mut deadline: Option<Instant> = None;

        loop {
            let wake_at = deadline.unwrap_or_else(Instant::now);
            tokio::select! {
                maybe = self.rx.recv() => {
                    match maybe {
                        Some(event) => {
                            if batch.is_empty() {
                                deadline = Some(Instant::now() + self.config.flush_interval);
                            }
                            batch.push(event);
                            if batch.len() >= self.config.batch_size {
                                self.flush(&mut batch).await;
                                deadline = None;
                            }
                        }
                        None => {
                            self.flush(&mut batch).await;
                            info!("audit ingestor stopped: all producers gone");
                            return;
                        }
                    }
                }
                _ = tokio::time::sleep_until(wake_at), if deadline.is_some() => {
                    self.flush(&mut batch).await;
                    deadline = None;
                }
                _ = shutdown.changed() => {
                    self.drain(&mut batch).await;
                    info!("audit ingestor stopped");
                    return;
                }
            }
        }
    }

    /// Pulls everything already sitting in the queue, then flushes the
    /// remainder. Used on shutdown only.
    async fn drain(&mut self, batch: &mut Vec<AuditEvent>) {
        while let Ok(event) = self.rx.try_recv() {
            batch.push(event);
            if batch.len() >= self.config.batch_size {
                self.flush(batch).await;
            }
        }
        self.flush(batch).await;
    }

    async fn flush(&self, batch: &mut Vec<AuditEvent>) {
        if batch.is_empty() {
            return;
        }
        let events = std::mem::take(batch);
        let count = events.len();

        match self.store.insert_batch(&events).await {
            Ok(()) => {
                self.stats
                    .events_persisted
                    .fetch_add(count as u64, Ordering::Relaxed);
                self.stats.batches_flushed.fetch_add(1, Ordering::Relaxed);
                debug!(count, "audit batch persisted");
            }
            Err(store_error) => {
                warn!(
                    %store_error,
                    count,
                    "audit batch rejected by store; diverting to fallback file"
                );
                match fallback::write_batch(&self.config.fallback_dir, &events) {
                    Ok(path) => {
                        self.stats.fallback_batches.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            path = %path.display(),
                            count,
                            "audit batch written to fallback file"
                        );
                    }
                    Err(fallback_error) => {
                        self.stats
                            .events_lost
                            .fetch_add(count as u64, Ordering::Relaxed);
                        log_lost_batch(&events, &fallback_error);
                    }
                }
            }
        }
    }
}

/// Last-resort visibility for a batch that could be saved nowhere.
fn log_lost_batch(events: &[AuditEvent], error: &fallback::FallbackError) {
    error!(
        %error,
        count = events.len(),
        "audit batch lost: store and fallback file both failed"
    );
    for event in events.iter().take(LOST_EVENT_LOG_LIMIT) {
        error!(
            event_id = %event.id,
            timestamp = %event.timestamp,
            action = %event.action,
            resource_type = %event.resource_type,
            resource_id = %event.resource_id,
            "lost audit event"
        );
    }
    if events.len() > LOST_EVENT_LOG_LIMIT {
        error!(
            remainder = events.len() - LOST_EVENT_LOG_LIMIT,
            "further audit events lost in the same batch"
        );
    }
}
