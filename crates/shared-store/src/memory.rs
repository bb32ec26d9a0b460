//! # In-Memory Store Adapter
//!
//! Implements every store port behind `parking_lot` locks. Lock scopes are
//! strictly synchronous; no guard is ever held across an await point.
//!
//! Seed methods (`add_*`) and inspection methods (`*_count`, `snapshot_*`)
//! sit outside the port traits: row creation for proposals, balances, and
//! endpoints belongs to the CRUD surface of the host application, which is
//! out of scope here, but fixtures and the default wiring still need a way
//! to populate the store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use shared_types::{
    AuditEvent, Organization, OutboundEvent, Proposal, ProposalOption, ShareBalance, Vote,
    WebhookEndpoint,
};
use uuid::Uuid;

use crate::error::StoreError;
use crate::ports::{
    AuditEventStore, OutboundEventStore, ProposalStore, ShareBalanceStore, VoteStore,
    WebhookEndpointStore,
};

/// Thread-safe in-memory implementation of all store ports.
#[derive(Default)]
pub struct InMemoryGovernanceStore {
    organizations: RwLock<HashMap<Uuid, Organization>>,
    proposals: RwLock<HashMap<Uuid, Proposal>>,
    options: RwLock<HashMap<Uuid, Vec<ProposalOption>>>,
    votes: RwLock<Vec<Vote>>,
    balances: RwLock<Vec<ShareBalance>>,
    audit_events: RwLock<Vec<AuditEvent>>,
    outbound: RwLock<Vec<OutboundEvent>>,
    endpoints: RwLock<Vec<WebhookEndpoint>>,
}

impl InMemoryGovernanceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an organization.
    pub fn add_organization(&self, organization: Organization) {
        self.organizations
            .write()
            .insert(organization.id, organization);
    }

    /// Inserts a proposal row.
    pub fn add_proposal(&self, proposal: Proposal) {
        self.proposals.write().insert(proposal.id, proposal);
    }

    /// Inserts an option row under its proposal.
    pub fn add_option(&self, option: ProposalOption) {
        self.options
            .write()
            .entry(option.proposal_id)
            .or_default()
            .push(option);
    }

    /// Inserts a share balance row.
    pub fn add_balance(&self, balance: ShareBalance) {
        self.balances.write().push(balance);
    }

    /// Registers a webhook endpoint.
    pub fn add_endpoint(&self, endpoint: WebhookEndpoint) {
        self.endpoints.write().push(endpoint);
    }

    /// Inserts audit rows directly, bypassing the pipeline. Fixtures use
    /// this to seed aged data for retention tests.
    pub fn add_audit_events(&self, events: Vec<AuditEvent>) {
        self.audit_events.write().extend(events);
    }

    /// Number of audit rows currently held.
    #[must_use]
    pub fn audit_event_count(&self) -> usize {
        self.audit_events.read().len()
    }

    /// Copy of the audit trail, insertion order.
    #[must_use]
    pub fn snapshot_audit_events(&self) -> Vec<AuditEvent> {
        self.audit_events.read().clone()
    }

    /// Copy of the outbound queue, insertion order.
    #[must_use]
    pub fn snapshot_outbound_events(&self) -> Vec<OutboundEvent> {
        self.outbound.read().clone()
    }

    /// Copy of all votes, insertion order.
    #[must_use]
    pub fn snapshot_votes(&self) -> Vec<Vote> {
        self.votes.read().clone()
    }
}

#[async_trait]
impl ProposalStore for InMemoryGovernanceStore {
    async fn get_proposal(&self, id: Uuid) -> Result<Proposal, StoreError> {
        self.proposals
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("proposal", id))
    }

    async fn update_proposal(&self, proposal: &Proposal) -> Result<(), StoreError> {
        let mut proposals = self.proposals.write();
        if !proposals.contains_key(&proposal.id) {
            return Err(StoreError::not_found("proposal", proposal.id));
        }
        proposals.insert(proposal.id, proposal.clone());
        Ok(())
    }

    async fn list_due_to_open(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Proposal>, StoreError> {
        let mut due: Vec<Proposal> = self
            .proposals
            .read()
            .values()
            .filter(|p| {
                p.status == shared_types::ProposalStatus::Draft
                    && p.start_at.is_some_and(|t| t <= now)
            })
            .cloned()
            .collect();
        due.sort_by_key(|p| p.start_at);
        due.truncate(limit);
        Ok(due)
    }

    async fn list_due_to_close(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Proposal>, StoreError> {
        let mut due: Vec<Proposal> = self
            .proposals
            .read()
            .values()
            .filter(|p| {
                p.status == shared_types::ProposalStatus::Open
                    && p.end_at.is_some_and(|t| t <= now)
            })
            .cloned()
            .collect();
        due.sort_by_key(|p| p.end_at);
        due.truncate(limit);
        Ok(due)
    }

    async fn list_options(&self, proposal_id: Uuid) -> Result<Vec<ProposalOption>, StoreError> {
        let mut options = self
            .options
            .read()
            .get(&proposal_id)
            .cloned()
            .unwrap_or_default();
        options.sort_by_key(|o| o.position);
        Ok(options)
    }
}

#[async_trait]
impl VoteStore for InMemoryGovernanceStore {
    async fn insert_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        let mut votes = self.votes.write();
        if votes
            .iter()
            .any(|v| v.proposal_id == vote.proposal_id && v.user_id == vote.user_id)
        {
            return Err(StoreError::Conflict(format!(
                "user {} already voted on proposal {}",
                vote.user_id, vote.proposal_id
            )));
        }
        votes.push(vote.clone());
        Ok(())
    }

    async fn has_voted(&self, proposal_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(self
            .votes
            .read()
            .iter()
            .any(|v| v.proposal_id == proposal_id && v.user_id == user_id))
    }

    async fn list_votes(&self, proposal_id: Uuid) -> Result<Vec<Vote>, StoreError> {
        Ok(self
            .votes
            .read()
            .iter()
            .filter(|v| v.proposal_id == proposal_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ShareBalanceStore for InMemoryGovernanceStore {
    async fn balances_for_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<ShareBalance>, StoreError> {
        Ok(self
            .balances
            .read()
            .iter()
            .filter(|b| b.organization_id == organization_id && b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn balances_for_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<ShareBalance>, StoreError> {
        Ok(self
            .balances
            .read()
            .iter()
            .filter(|b| b.organization_id == organization_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditEventStore for InMemoryGovernanceStore {
    async fn insert_batch(&self, events: &[AuditEvent]) -> Result<(), StoreError> {
        self.audit_events.write().extend_from_slice(events);
        Ok(())
    }

    async fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
        limit: u32,
    ) -> Result<u64, StoreError> {
        let mut events = self.audit_events.write();
        let mut deleted: u64 = 0;
        events.retain(|ev| {
            if deleted < u64::from(limit) && ev.timestamp < cutoff {
                deleted += 1;
                false
            } else {
                true
            }
        });
        Ok(deleted)
    }
}

#[async_trait]
impl OutboundEventStore for InMemoryGovernanceStore {
    async fn insert_event(&self, event: &OutboundEvent) -> Result<(), StoreError> {
        self.outbound.write().push(event.clone());
        Ok(())
    }

    async fn update_event(&self, event: &OutboundEvent) -> Result<(), StoreError> {
        let mut outbound = self.outbound.write();
        match outbound.iter_mut().find(|e| e.id == event.id) {
            Some(row) => {
                *row = event.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("outbound event", event.id)),
        }
    }

    async fn list_pending(&self, limit: usize) -> Result<Vec<OutboundEvent>, StoreError> {
        let mut pending: Vec<OutboundEvent> = self
            .outbound
            .read()
            .iter()
            .filter(|e| e.status == shared_types::DeliveryStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|e| e.created_at);
        pending.truncate(limit);
        Ok(pending)
    }
}

#[async_trait]
impl WebhookEndpointStore for InMemoryGovernanceStore {
    async fn active_endpoints(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<WebhookEndpoint>, StoreError> {
        Ok(self
            .endpoints
            .read()
            .iter()
            .filter(|e| e.organization_id == organization_id && e.active)
            .cloned()
            .collect())
    }
}
