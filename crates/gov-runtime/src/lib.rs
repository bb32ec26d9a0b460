//! # Governance Runtime Library
//!
//! Assembly of the governance subsystem: the pure command engine from
//! `gov-engine`, the four background loops (`gov-lifecycle`, `gov-audit`,
//! `gov-retention`, `gov-webhook`), and one shared store behind them all.
//!
//! The library exposes the wiring for embedding hosts and for the test
//! suite; the `gov-runtime` binary in `main.rs` is a thin entry point
//! over [`GovernanceRuntime::start`].
//!
//! ## Coordination Model
//!
//! There is no bus between the loops. Every hand-off goes through store
//! rows: the command layer enqueues outbound events the dispatcher later
//! polls, the scheduler calls the same command layer a user-facing host
//! would, and audit events flow through one bounded queue into the store.
//! Locking a row's status is therefore the only cross-loop protocol.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod runtime;
pub mod sink;

pub use config::{RuntimeConfig, RuntimeConfigError};
pub use runtime::GovernanceRuntime;
pub use sink::RecorderAuditSink;
