//! # Governance Engine
//!
//! The single decision point for proposal lifecycle rules. Every mutation
//! of governance state, whether it originates from the request path or
//! from the lifecycle scheduler, flows through this crate.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ service::GovernanceService                  │  re-fetch, validate,
//! │   open / close / finalize / schedule / vote │  persist, enqueue
//! ├─────────────────────────────────────────────┤
//! │ domain::{transitions, tally, power}         │  pure functions,
//! │                                             │  no I/O, no clocks
//! ├─────────────────────────────────────────────┤
//! │ ports::AuditSink + shared-store ports       │  driven ports
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//!
//! - Proposal status moves only forward: Draft → Open → Closed → Finalized.
//! - Votes are immutable and unique per (proposal, user).
//! - Tally results are deterministic: ties break to the option with the
//!   lowest creation position, and a zero-eligible-power proposal never
//!   meets quorum (and never divides by zero).
//! - Each state transition enqueues exactly one outbound event and one
//!   audit event.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod error;
pub mod events;
pub mod ports;
pub mod service;

pub use domain::power::calculate_voting_power;
pub use domain::tally::{compute_results, OptionTally, TallyResult};
pub use domain::transitions::{
    validate_can_close, validate_can_finalize, validate_can_open, validate_can_vote,
    validate_editable, validate_schedule,
};
pub use error::{CommandError, GovernanceError};
pub use ports::{AuditSink, NullAuditSink};
pub use service::{GovernanceService, GovernanceStore};
