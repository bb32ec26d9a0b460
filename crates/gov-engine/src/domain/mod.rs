//! # Domain Layer - Governance Engine
//!
//! Pure business logic. Functions in this layer take every input as a
//! parameter, perform no I/O, and read no clocks, which is what makes the
//! command layer's re-fetch-and-revalidate pattern safe to call from both
//! the request path and the scheduler.
//!
//! ## Components
//!
//! - `transitions`: lifecycle validation (open / close / finalize / vote)
//! - `tally`: deterministic result computation with quorum evaluation
//! - `power`: voting power aggregation over share balances

pub mod power;
pub mod tally;
pub mod transitions;

pub use power::*;
pub use tally::*;
pub use transitions::*;
