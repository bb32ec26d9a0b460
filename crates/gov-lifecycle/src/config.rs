//! Scheduler configuration.

use std::time::Duration;

/// Tuning for the lifecycle scheduler loop.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// How often the loop wakes to look for due proposals.
    pub poll_interval: Duration,
    /// Maximum proposals fetched per direction (open/close) per tick.
    /// A backlog larger than this drains across consecutive ticks.
    pub batch_size: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            batch_size: 100,
        }
    }
}
