//! The dispatch loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared_types::{DeliveryStatus, OutboundEvent};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::WebhookConfig;
use crate::ports::{DeliveryRequest, DeliveryStore, WebhookTransport};
use crate::signature::sign_payload;

/// Counters exposed by the dispatcher.
#[derive(Debug, Default)]
pub struct DispatchStats {
    /// Events that reached every matching endpoint.
    pub events_delivered: AtomicU64,
    /// Events that exhausted their retries.
    pub events_failed: AtomicU64,
    /// Individual POSTs attempted, across all endpoints and retries.
    pub delivery_attempts: AtomicU64,
}

/// Polls the outbound queue and fans each event out to its subscribers.
///
/// Fan-out within one event is sequential: organizations register a
/// handful of endpoints at most, and sequential delivery keeps the
/// failure accounting per event trivially ordered.
pub struct WebhookDispatcher<S> {
    store: Arc<S>,
    transport: Arc<dyn WebhookTransport>,
    config: WebhookConfig,
    stats: Arc<DispatchStats>,
}

impl<S: DeliveryStore> WebhookDispatcher<S> {
    /// Creates a dispatcher over the given store and transport.
    pub fn new(
        store: Arc<S>,
        transport: Arc<dyn WebhookTransport>,
        config: WebhookConfig,
    ) -> Self {
        Self {
            store,
            transport,
            config,
            stats: Arc::new(DispatchStats::default()),
        }
    }

    /// Shared handle to the loop's counters.
    pub fn stats(&self) -> Arc<DispatchStats> {
        Arc::clone(&self.stats)
    }

    /// Runs until the shutdown channel flips.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            batch_size = self.config.batch_size,
            max_retries = self.config.max_retries,
            "webhook dispatcher started"
        );
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick(Utc::now(), &shutdown).await;
                }
                _ = shutdown.changed() => {
                    info!("webhook dispatcher stopped");
                    return;
                }
            }
        }
    }

    /// One dispatch pass over the oldest pending events.
    ///
    /// Each event's outcome is persisted before the next event is
    /// touched, so a crash mid-batch re-attempts at most one event.
    pub async fn tick(&self, now: DateTime<Utc>, shutdown: &watch::Receiver<bool>) {
        let pending = match self.store.list_pending(self.config.batch_size).await {
            Ok(batch) => batch,
            Err(store_error) => {
                error!(%store_error, "pending-event query failed; retrying next tick");
                return;
            }
        };

        for mut event in pending {
            if *shutdown.borrow() {
                return;
            }
            self.dispatch_event(&mut event, now).await;
        }
    }

    async fn dispatch_event(&self, event: &mut OutboundEvent, now: DateTime<Utc>) {
        let endpoints = match self.store.active_endpoints(event.organization_id).await {
            Ok(endpoints) => endpoints,
            Err(store_error) => {
                error!(
                    event_id = %event.id,
                    %store_error,
                    "endpoint query failed; event retries next tick"
                );
                return;
            }
        };

        let matching: Vec<_> = endpoints
            .iter()
            .filter(|endpoint| endpoint.subscribes_to(&event.event_type))
            .collect();
        if matching.is_empty() {
            // Not an attempt: the event keeps waiting, and an endpoint
            // registered later still receives it.
            debug!(
                event_id = %event.id,
                event_type = %event.event_type,
                "no subscribed endpoint; leaving event pending"
            );
            return;
        }

        let mut all_succeeded = true;
        for endpoint in matching {
            let request = DeliveryRequest {
                url: endpoint.url.clone(),
                event_type: event.event_type.clone(),
                event_id: event.id,
                organization_id: event.organization_id,
                body: event.payload.clone(),
                signature: sign_payload(&endpoint.secret, &event.payload),
            };
            self.stats.delivery_attempts.fetch_add(1, Ordering::Relaxed);
            match self.transport.deliver(&request).await {
                Ok(()) => {
                    debug!(event_id = %event.id, url = %endpoint.url, "webhook delivered");
                }
                Err(delivery_error) => {
                    all_succeeded = false;
                    warn!(
                        event_id = %event.id,
                        url = %endpoint.url,
                        %delivery_error,
                        attempt = event.attempt_count + 1,
                        "webhook delivery failed"
                    );
                }
            }
        }

        event.attempt_count += 1;
        event.last_attempt_at = Some(now);
        event.status = if all_succeeded {
            DeliveryStatus::Delivered
        } else if event.attempt_count >= self.config.max_retries {
            DeliveryStatus::Failed
        } else {
            DeliveryStatus::Pending
        };

        match event.status {
            DeliveryStatus::Delivered => {
                self.stats.events_delivered.fetch_add(1, Ordering::Relaxed);
            }
            DeliveryStatus::Failed => {
                self.stats.events_failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    event_id = %event.id,
                    attempts = event.attempt_count,
                    "webhook event failed permanently; retries exhausted"
                );
            }
            DeliveryStatus::Pending => {}
        }

        if let Err(store_error) = self.store.update_event(event).await {
            error!(
                event_id = %event.id,
                %store_error,
                "failed to persist delivery state; event re-attempts next tick"
            );
        }
    }
}
