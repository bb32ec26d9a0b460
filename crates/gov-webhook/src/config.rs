//! Dispatcher configuration.

use std::time::Duration;

/// Tuning for the webhook dispatcher loop.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// How often the loop polls the outbound queue.
    pub poll_interval: Duration,
    /// Maximum pending events fetched per tick, oldest first.
    pub batch_size: usize,
    /// Attempts before an event is marked `Failed` for good.
    pub max_retries: u32,
    /// Per-request delivery timeout; a response slower than this counts
    /// as a failed attempt.
    pub delivery_timeout: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            batch_size: 100,
            max_retries: 3,
            delivery_timeout: Duration::from_secs(30),
        }
    }
}
