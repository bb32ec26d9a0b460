//! # Runtime Assembly
//!
//! Wires the command service and the four background loops over one
//! shared store, then supervises them until shutdown.
//!
//! ## Startup Sequence
//!
//! 1. Validate the full configuration (fail fast, nothing spawned yet)
//! 2. Build the audit pipeline and hand its recorder to the command layer
//! 3. Construct the lifecycle scheduler, retention purger, and webhook
//!    dispatcher over the same store
//! 4. Spawn all four loops on one shared shutdown channel
//!
//! ## Shutdown Sequence
//!
//! 1. Flip the shutdown channel
//! 2. Await every loop task; the audit ingestor drains its queue and
//!    flushes before exiting, the others stop between units of work

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use gov_audit::AuditRecorder;
use gov_engine::{GovernanceService, GovernanceStore};
use gov_lifecycle::LifecycleScheduler;
use gov_retention::{PurgeSchedule, RetentionPurger};
use gov_webhook::{DeliveryStore, HttpWebhookTransport, WebhookDispatcher};
use shared_store::AuditEventStore;

use crate::config::RuntimeConfig;
use crate::sink::RecorderAuditSink;

/// The assembled governance runtime.
///
/// Holds the command service handle for embedding hosts (an API layer
/// calls [`Self::service`]) and the spawned loop tasks for shutdown.
pub struct GovernanceRuntime<S> {
    service: Arc<GovernanceService<S>>,
    recorder: AuditRecorder,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl<S> GovernanceRuntime<S>
where
    S: GovernanceStore + DeliveryStore + AuditEventStore + 'static,
{
    /// Validates the configuration, wires every component, and spawns
    /// the background loops.
    pub fn start(store: Arc<S>, config: RuntimeConfig) -> Result<Self> {
        config.validate().context("invalid runtime configuration")?;
        let schedule = PurgeSchedule::parse(&config.retention.schedule)
            .context("invalid retention schedule")?;

        let (recorder, ingestor) = gov_audit::pipeline(config.audit, Arc::clone(&store));
        let sink = Arc::new(RecorderAuditSink::new(recorder.clone()));
        let service = Arc::new(GovernanceService::new(Arc::clone(&store), sink));

        let scheduler =
            LifecycleScheduler::new(Arc::clone(&store), Arc::clone(&service), config.lifecycle);
        let purger = RetentionPurger::new(Arc::clone(&store), config.retention, schedule);
        let transport = Arc::new(
            HttpWebhookTransport::new(config.webhook.delivery_timeout)
                .context("building webhook HTTP client")?,
        );
        let dispatcher = WebhookDispatcher::new(Arc::clone(&store), transport, config.webhook);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut handles = Vec::with_capacity(4);

        let rx = shutdown_rx.clone();
        handles.push(tokio::spawn(async move { ingestor.run(rx).await }));
        let rx = shutdown_rx.clone();
        handles.push(tokio::spawn(async move { scheduler.run(rx).await }));
        let rx = shutdown_rx.clone();
        handles.push(tokio::spawn(async move { purger.run(rx).await }));
        handles.push(tokio::spawn(async move { dispatcher.run(shutdown_rx).await }));

        info!("governance runtime started");
        Ok(Self {
            service,
            recorder,
            shutdown_tx,
            handles,
        })
    }

    /// Handle to the synchronous command layer.
    pub fn service(&self) -> Arc<GovernanceService<S>> {
        Arc::clone(&self.service)
    }

    /// Handle to the audit pipeline, for hosts recording their own events
    /// (logins, permission changes) alongside governance ones.
    pub fn recorder(&self) -> AuditRecorder {
        self.recorder.clone()
    }

    /// Stops every loop and waits for each to finish its current unit of
    /// work. The audit queue is drained, not dropped.
    pub async fn shutdown(self) {
        info!("governance runtime stopping");
        if self.shutdown_tx.send(true).is_err() {
            error!("all loop tasks already gone before shutdown signal");
        }
        for handle in self.handles {
            if let Err(join_error) = handle.await {
                error!(%join_error, "loop task panicked");
            }
        }
        info!("governance runtime stopped");
    }
}
