//! # Shared Store Crate
//!
//! Port traits for the durable store. Every subsystem talks to persistence
//! through these narrow, aggregate-scoped interfaces; the store rows are the
//! only coordination channel between the background loops.
//!
//! ## Ports
//!
//! | Trait | Aggregate | Consumers |
//! |-------|-----------|-----------|
//! | [`ProposalStore`] | proposals + options | engine, lifecycle scheduler |
//! | [`VoteStore`] | votes | engine |
//! | [`ShareBalanceStore`] | share balances | engine |
//! | [`AuditEventStore`] | audit trail | audit pipeline, retention purger |
//! | [`OutboundEventStore`] | delivery queue | engine, webhook dispatcher |
//! | [`WebhookEndpointStore`] | endpoint registry | webhook dispatcher |
//!
//! ## Adapters
//!
//! [`InMemoryGovernanceStore`] implements every port behind `parking_lot`
//! locks. It backs the default runtime wiring and the test suite; a SQL
//! adapter is the host application's concern.

pub mod error;
pub mod memory;
pub mod ports;

pub use error::StoreError;
pub use memory::InMemoryGovernanceStore;
pub use ports::{
    AuditEventStore, OutboundEventStore, ProposalStore, ShareBalanceStore, VoteStore,
    WebhookEndpointStore,
};
