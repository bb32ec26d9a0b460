//! # Governance Command Layer
//!
//! [`GovernanceService`] is the shared mutation path for proposals and
//! votes. The request path and the lifecycle scheduler both call it, and
//! every operation follows the same shape:
//!
//! 1. Re-fetch the target row fresh from the store (never trust a batch
//!    snapshot; a candidate may have been advanced by a concurrent caller).
//! 2. Validate through the pure domain functions.
//! 3. Persist the new state.
//! 4. Enqueue exactly one `OutboundEvent` for the transition and hand
//!    exactly one `AuditEvent` to the [`AuditSink`].
//!
//! Because step 2 always runs against the row read in step 1, a stale
//! candidate fails with a validation error here instead of being
//! double-processed. The store row is the single serialization point;
//! nothing else guards against concurrent callers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared_store::{
    OutboundEventStore, ProposalStore, ShareBalanceStore, VoteStore,
};
use shared_types::{
    event_types, AuditAction, AuditEvent, OutboundEvent, Proposal, ProposalStatus, Vote,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::power::calculate_voting_power;
use crate::domain::tally::compute_results;
use crate::domain::transitions::{
    validate_can_close, validate_can_finalize, validate_can_open, validate_can_vote,
    validate_editable, validate_schedule,
};
use crate::error::{CommandError, GovernanceError};
use crate::events;
use crate::ports::AuditSink;

/// Everything the command layer needs from persistence.
///
/// Blanket-implemented for any store that serves all four aggregates, so
/// the runtime can hand the same adapter to the engine and to the loops.
pub trait GovernanceStore:
    ProposalStore + VoteStore + ShareBalanceStore + OutboundEventStore + Send + Sync
{
}

impl<T> GovernanceStore for T where
    T: ProposalStore + VoteStore + ShareBalanceStore + OutboundEventStore + Send + Sync
{
}

/// Synchronous command service over the governance domain.
pub struct GovernanceService<S> {
    store: Arc<S>,
    audit: Arc<dyn AuditSink>,
}

impl<S: GovernanceStore> GovernanceService<S> {
    /// Creates a service over the given store and audit sink.
    pub fn new(store: Arc<S>, audit: Arc<dyn AuditSink>) -> Self {
        Self { store, audit }
    }

    /// Sets or replaces a Draft proposal's voting window.
    ///
    /// Scheduling is not a lifecycle transition, so no outbound event is
    /// enqueued; the change is audited only.
    pub async fn schedule_proposal(
        &self,
        proposal_id: Uuid,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Proposal, CommandError> {
        let mut proposal = self.store.get_proposal(proposal_id).await?;
        validate_editable(&proposal)?;
        validate_schedule(start_at, end_at)?;

        proposal.start_at = Some(start_at);
        proposal.end_at = Some(end_at);
        proposal.updated_at = now;
        self.store.update_proposal(&proposal).await?;

        debug!(
            proposal_id = %proposal.id,
            %start_at,
            %end_at,
            "proposal voting window scheduled"
        );
        self.record_audit(
            AuditEvent::new(AuditAction::Updated, "Proposal", proposal.id.to_string(), now)
                .with_organization(proposal.organization_id)
                .with_details(serde_json::json!({
                    "startAt": start_at,
                    "endAt": end_at,
                })),
            actor,
        )
        .await;
        Ok(proposal)
    }

    /// Opens a Draft proposal for voting.
    ///
    /// Captures the organization-wide eligible voting power snapshot at
    /// this moment; votes are later weighed against it for quorum. A
    /// proposal carrying a backwards voting window never opens.
    pub async fn open_proposal(
        &self,
        proposal_id: Uuid,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Proposal, CommandError> {
        let mut proposal = self.store.get_proposal(proposal_id).await?;
        validate_can_open(&proposal)?;
        if let (Some(start), Some(end)) = (proposal.start_at, proposal.end_at) {
            validate_schedule(start, end)?;
        }

        let balances = self
            .store
            .balances_for_organization(proposal.organization_id)
            .await?;
        proposal.eligible_voting_power = calculate_voting_power(&balances);
        proposal.status = ProposalStatus::Open;
        proposal.updated_at = now;
        self.store.update_proposal(&proposal).await?;

        let payload = events::proposal_opened(&proposal, now);
        self.store
            .insert_event(&OutboundEvent::pending(
                proposal.organization_id,
                event_types::PROPOSAL_OPENED,
                payload,
                now,
            ))
            .await?;

        info!(
            proposal_id = %proposal.id,
            organization_id = %proposal.organization_id,
            eligible_voting_power = %proposal.eligible_voting_power,
            "proposal opened"
        );
        self.record_audit(
            self.transition_audit(&proposal, now)
                .with_details(serde_json::json!({
                    "from": ProposalStatus::Draft,
                    "to": ProposalStatus::Open,
                    "eligibleVotingPower": proposal.eligible_voting_power,
                })),
            actor,
        )
        .await;
        Ok(proposal)
    }

    /// Closes an Open proposal and persists its tally.
    ///
    /// The tally is computed over the full vote set at close time; the
    /// winning option, quorum verdict, and total cast power are written
    /// onto the proposal row exactly once.
    pub async fn close_proposal(
        &self,
        proposal_id: Uuid,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Proposal, CommandError> {
        let mut proposal = self.store.get_proposal(proposal_id).await?;
        validate_can_close(&proposal)?;

        let options = self.store.list_options(proposal.id).await?;
        let votes = self.store.list_votes(proposal.id).await?;
        let tally = compute_results(&proposal, &options, &votes);

        proposal.status = ProposalStatus::Closed;
        proposal.winning_option_id = tally.winning_option_id;
        proposal.quorum_met = tally.quorum_met;
        proposal.total_votes_cast = tally.total_votes_cast;
        proposal.closed_at = Some(now);
        proposal.updated_at = now;
        self.store.update_proposal(&proposal).await?;

        let payload = events::proposal_closed(&proposal, &tally, now);
        self.store
            .insert_event(&OutboundEvent::pending(
                proposal.organization_id,
                event_types::PROPOSAL_CLOSED,
                payload,
                now,
            ))
            .await?;

        info!(
            proposal_id = %proposal.id,
            organization_id = %proposal.organization_id,
            winning_option = ?tally.winning_option_id,
            quorum_met = tally.quorum_met,
            total_votes_cast = %tally.total_votes_cast,
            "proposal closed"
        );
        self.record_audit(
            self.transition_audit(&proposal, now)
                .with_details(serde_json::json!({
                    "from": ProposalStatus::Open,
                    "to": ProposalStatus::Closed,
                    "winningOptionId": tally.winning_option_id,
                    "quorumMet": tally.quorum_met,
                    "totalVotesCast": tally.total_votes_cast,
                })),
            actor,
        )
        .await;
        Ok(proposal)
    }

    /// Finalizes a Closed proposal, ratifying its results.
    pub async fn finalize_proposal(
        &self,
        proposal_id: Uuid,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Proposal, CommandError> {
        let mut proposal = self.store.get_proposal(proposal_id).await?;
        validate_can_finalize(&proposal)?;

        proposal.status = ProposalStatus::Finalized;
        proposal.updated_at = now;
        self.store.update_proposal(&proposal).await?;

        let payload = events::proposal_finalized(&proposal, now);
        self.store
            .insert_event(&OutboundEvent::pending(
                proposal.organization_id,
                event_types::PROPOSAL_FINALIZED,
                payload,
                now,
            ))
            .await?;

        info!(
            proposal_id = %proposal.id,
            organization_id = %proposal.organization_id,
            "proposal finalized"
        );
        self.record_audit(
            self.transition_audit(&proposal, now)
                .with_details(serde_json::json!({
                    "from": ProposalStatus::Closed,
                    "to": ProposalStatus::Finalized,
                })),
            actor,
        )
        .await;
        Ok(proposal)
    }

    /// Casts a vote on an Open proposal.
    ///
    /// The voter's power is snapshotted from their share balances at cast
    /// time. A voter with no power, a duplicate ballot, or an option from
    /// another proposal is rejected before anything is written.
    pub async fn cast_vote(
        &self,
        proposal_id: Uuid,
        user_id: Uuid,
        option_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vote, CommandError> {
        let proposal = self.store.get_proposal(proposal_id).await?;
        let has_already_voted = self.store.has_voted(proposal_id, user_id).await?;
        validate_can_vote(&proposal, user_id, has_already_voted)?;

        let options = self.store.list_options(proposal_id).await?;
        if !options.iter().any(|o| o.id == option_id) {
            return Err(GovernanceError::UnknownOption {
                proposal_id,
                option_id,
            }
            .into());
        }

        let balances = self
            .store
            .balances_for_user(proposal.organization_id, user_id)
            .await?;
        let voting_power = calculate_voting_power(&balances);
        if voting_power.is_zero() {
            return Err(GovernanceError::NoVotingPower { user_id }.into());
        }

        let vote = Vote::new(proposal_id, option_id, user_id, voting_power, now);
        self.store.insert_vote(&vote).await?;

        let payload = events::vote_cast(&vote, proposal.organization_id, now);
        self.store
            .insert_event(&OutboundEvent::pending(
                proposal.organization_id,
                event_types::VOTE_CAST,
                payload,
                now,
            ))
            .await?;

        debug!(
            proposal_id = %proposal_id,
            user_id = %user_id,
            voting_power = %voting_power,
            "vote cast"
        );
        self.record_audit(
            AuditEvent::new(AuditAction::VoteCast, "Vote", vote.id.to_string(), now)
                .with_actor(user_id.to_string())
                .with_organization(proposal.organization_id)
                .with_details(serde_json::json!({
                    "proposalId": proposal_id,
                    "optionId": option_id,
                    "votingPower": voting_power,
                })),
            None,
        )
        .await;
        Ok(vote)
    }

    fn transition_audit(&self, proposal: &Proposal, now: DateTime<Utc>) -> AuditEvent {
        AuditEvent::new(
            AuditAction::StatusChanged,
            "Proposal",
            proposal.id.to_string(),
            now,
        )
        .with_organization(proposal.organization_id)
    }

    async fn record_audit(&self, event: AuditEvent, actor: Option<&str>) {
        let event = match actor {
            Some(actor) => event.with_actor(actor),
            None => event,
        };
        self.audit.record(event).await;
    }
}
