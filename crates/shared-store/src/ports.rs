//! # Store Ports (Driven Ports)
//!
//! One trait per persisted aggregate. Implementations must be safe to share
//! across the background loops (`Send + Sync`, interior mutability).
//!
//! Production: host-provided SQL adapter.
//! Testing / default wiring: [`crate::InMemoryGovernanceStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{
    AuditEvent, OutboundEvent, Proposal, ProposalOption, ShareBalance, Vote, WebhookEndpoint,
};
use uuid::Uuid;

use crate::error::StoreError;

/// Proposal rows and their options.
#[async_trait]
pub trait ProposalStore: Send + Sync {
    /// Fetch one proposal. `NotFound` if the id misses.
    async fn get_proposal(&self, id: Uuid) -> Result<Proposal, StoreError>;

    /// Persist an updated proposal row.
    async fn update_proposal(&self, proposal: &Proposal) -> Result<(), StoreError>;

    /// Draft proposals whose `start_at` is at or before `now`, oldest
    /// schedule first, capped at `limit`.
    async fn list_due_to_open(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Proposal>, StoreError>;

    /// Open proposals whose `end_at` is at or before `now`, oldest
    /// schedule first, capped at `limit`.
    async fn list_due_to_close(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Proposal>, StoreError>;

    /// All options of a proposal, ordered by creation position.
    async fn list_options(&self, proposal_id: Uuid) -> Result<Vec<ProposalOption>, StoreError>;
}

/// Immutable ballot rows.
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Insert a new vote. `Conflict` if the (proposal, user) pair already
    /// voted; the unique constraint is the backstop behind the engine's
    /// own duplicate check.
    async fn insert_vote(&self, vote: &Vote) -> Result<(), StoreError>;

    /// Whether the user has already voted on the proposal.
    async fn has_voted(&self, proposal_id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;

    /// All votes cast on a proposal.
    async fn list_votes(&self, proposal_id: Uuid) -> Result<Vec<Vote>, StoreError>;
}

/// Share balance rows with the class voting weight resolved on.
#[async_trait]
pub trait ShareBalanceStore: Send + Sync {
    /// One user's balances within an organization.
    async fn balances_for_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<ShareBalance>, StoreError>;

    /// Every balance in an organization. Feeds the eligible-power
    /// snapshot taken when a proposal opens.
    async fn balances_for_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<ShareBalance>, StoreError>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditEventStore: Send + Sync {
    /// Persist a batch of audit events in one write.
    async fn insert_batch(&self, events: &[AuditEvent]) -> Result<(), StoreError>;

    /// Delete up to `limit` events with `timestamp` strictly before
    /// `cutoff`. Returns the number of rows actually deleted; `0` means
    /// nothing older remains.
    async fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
        limit: u32,
    ) -> Result<u64, StoreError>;
}

/// Durable delivery queue.
#[async_trait]
pub trait OutboundEventStore: Send + Sync {
    /// Enqueue a new pending event.
    async fn insert_event(&self, event: &OutboundEvent) -> Result<(), StoreError>;

    /// Persist the post-attempt state of one event (status, attempt
    /// count, last attempt time).
    async fn update_event(&self, event: &OutboundEvent) -> Result<(), StoreError>;

    /// Pending events, oldest `created_at` first, capped at `limit`.
    async fn list_pending(&self, limit: usize) -> Result<Vec<OutboundEvent>, StoreError>;
}

/// Webhook endpoint registry.
#[async_trait]
pub trait WebhookEndpointStore: Send + Sync {
    /// Active endpoints registered by an organization. Inactive endpoints
    /// are filtered out by the store query.
    async fn active_endpoints(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<WebhookEndpoint>, StoreError>;
}
