//! Purger configuration.

use std::time::Duration;

use thiserror::Error;

/// Shortest retention window the purger will enforce. Compliance reviews
/// assume at least a month of trail.
pub const MIN_RETENTION_DAYS: u32 = 30;

/// Largest delete batch a single pass may issue.
pub const MAX_PURGE_BATCH_SIZE: u32 = 10_000;

/// Tuning for the retention purger.
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    /// Audit events older than this many days are deleted.
    pub retention_days: u32,
    /// When the daily purge runs, in the reduced cron form read by
    /// [`crate::PurgeSchedule::parse`].
    pub schedule: String,
    /// Rows deleted per pass.
    pub batch_size: u32,
    /// Pause between delete passes, yielding the store to foreground
    /// work.
    pub batch_delay: Duration,
    /// How often the loop wakes to check whether the purge is due.
    pub check_interval: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            retention_days: 90,
            schedule: "0 3 * * *".to_string(),
            batch_size: 1000,
            batch_delay: Duration::from_millis(100),
            check_interval: Duration::from_secs(3600),
        }
    }
}

impl RetentionConfig {
    /// Rejects configurations outside the supported ranges.
    pub fn validate(&self) -> Result<(), RetentionConfigError> {
        if self.retention_days < MIN_RETENTION_DAYS {
            return Err(RetentionConfigError::RetentionTooShort(
                self.retention_days,
            ));
        }
        if self.batch_size == 0 || self.batch_size > MAX_PURGE_BATCH_SIZE {
            return Err(RetentionConfigError::BatchSizeOutOfRange(self.batch_size));
        }
        Ok(())
    }
}

/// A retention configuration the purger refuses to run with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetentionConfigError {
    /// `retention_days` is below the 30-day floor.
    #[error("retention_days must be at least 30, got {0}")]
    RetentionTooShort(u32),

    /// `batch_size` is zero or above the 10000 cap.
    #[error("batch_size must be between 1 and 10000, got {0}")]
    BatchSizeOutOfRange(u32),
}
