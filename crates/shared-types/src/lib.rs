//! # Shared Types Crate
//!
//! This crate contains all governance domain entities shared across
//! subsystems: proposals and votes, audit records, and outbound delivery
//! records.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **No I/O, no clocks**: Every constructor takes its timestamp as a
//!   parameter; entities never read the wall clock themselves.
//! - **Store-shaped**: These are the rows the durable store persists, not
//!   wire formats. Wire payloads are built by the engine from these types.

pub mod audit;
pub mod delivery;
pub mod entities;

pub use audit::*;
pub use delivery::*;
pub use entities::*;
