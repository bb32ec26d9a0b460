//! # Governance Runtime
//!
//! Entry point for the governance subsystem. Runs the proposal lifecycle
//! scheduler, the audit ingestion pipeline, the retention purger, and the
//! webhook dispatcher over an in-memory store until Ctrl+C.
//!
//! ## Startup Sequence
//!
//! 1. Initialize structured logging
//! 2. Load configuration (defaults, then `GOV_*` environment overrides)
//! 3. Validate and wire everything; abort on the first bad setting
//! 4. Run until the shutdown signal, then drain and stop every loop

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use gov_runtime::{GovernanceRuntime, RuntimeConfig};
use shared_store::InMemoryGovernanceStore;

/// Load configuration from defaults plus environment overrides.
fn load_config() -> RuntimeConfig {
    let mut config = RuntimeConfig::default();

    if let Ok(days) = std::env::var("GOV_RETENTION_DAYS") {
        match days.parse() {
            Ok(parsed) => config.retention.retention_days = parsed,
            Err(_) => warn!("GOV_RETENTION_DAYS must be a whole number of days"),
        }
    }
    if let Ok(schedule) = std::env::var("GOV_RETENTION_SCHEDULE") {
        config.retention.schedule = schedule;
    }
    if let Ok(dir) = std::env::var("GOV_AUDIT_FALLBACK_DIR") {
        config.audit.fallback_dir = PathBuf::from(dir);
    }
    if let Ok(capacity) = std::env::var("GOV_AUDIT_QUEUE_CAPACITY") {
        match capacity.parse() {
            Ok(parsed) => config.audit.queue_capacity = parsed,
            Err(_) => warn!("GOV_AUDIT_QUEUE_CAPACITY must be a whole number"),
        }
    }
    if let Ok(secs) = std::env::var("GOV_LIFECYCLE_POLL_SECS") {
        match secs.parse() {
            Ok(parsed) => config.lifecycle.poll_interval = Duration::from_secs(parsed),
            Err(_) => warn!("GOV_LIFECYCLE_POLL_SECS must be a whole number of seconds"),
        }
    }
    if let Ok(secs) = std::env::var("GOV_WEBHOOK_POLL_SECS") {
        match secs.parse() {
            Ok(parsed) => config.webhook.poll_interval = Duration::from_secs(parsed),
            Err(_) => warn!("GOV_WEBHOOK_POLL_SECS must be a whole number of seconds"),
        }
    }
    if let Ok(retries) = std::env::var("GOV_WEBHOOK_MAX_RETRIES") {
        match retries.parse() {
            Ok(parsed) => config.webhook.max_retries = parsed,
            Err(_) => warn!("GOV_WEBHOOK_MAX_RETRIES must be a whole number"),
        }
    }

    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config();
    let store = Arc::new(InMemoryGovernanceStore::new());
    let runtime = GovernanceRuntime::start(store, config)?;

    info!("governance runtime is running; press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
