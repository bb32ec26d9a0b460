//! # Audit Retention Purger
//!
//! Enforces the audit retention window: once per calendar day, at a
//! configured hour and minute, events older than `retention_days` are
//! deleted in bounded batches with a pause between passes.
//!
//! The schedule is a deliberate subset of cron. Five fields are accepted
//! for familiarity, but only minute and hour are read; a non-wildcard
//! day-of-month, month, or day-of-week is warned about and ignored rather
//! than silently honored or rejected.
//!
//! Each purge ends by recording a summary audit event (actor `"System"`)
//! through the same store it purges, so the trail itself says when it was
//! trimmed and how much was removed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod purger;
pub mod schedule;

pub use config::{RetentionConfig, RetentionConfigError};
pub use purger::{PurgeOutcome, RetentionPurger};
pub use schedule::{PurgeSchedule, ScheduleError};
