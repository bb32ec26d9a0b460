//! # Proposal Lifecycle Scheduler
//!
//! A singleton background loop that advances time-scheduled proposals.
//! Each tick it asks the store for proposals due to open (Draft with
//! `start_at` in the past) and due to close (Open with `end_at` in the
//! past), one bounded batch per direction, and pushes each candidate
//! through the governance engine.
//!
//! The scheduler itself decides nothing: the engine re-fetches and
//! re-validates every candidate, so a proposal that was advanced between
//! the batch query and the transition fails validation there and is
//! simply skipped. Skips and store errors are logged and never kill the
//! loop; a proposal that cannot transition this tick is retried on the
//! next one for as long as it still matches the due query.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod scheduler;

pub use config::LifecycleConfig;
pub use scheduler::{LifecycleScheduler, SchedulerStats};
