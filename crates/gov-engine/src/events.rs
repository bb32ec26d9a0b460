//! Outbound payload builders.
//!
//! Each builder renders the JSON body for one event type. The string
//! returned here is stored verbatim on the `OutboundEvent` row and later
//! signed and POSTed byte-for-byte, so it is rendered exactly once.
//!
//! Keys are camelCase to match the platform's public JSON surface.
//! Decimal values serialize as decimal strings, timestamps as RFC 3339.

use chrono::{DateTime, Utc};
use serde_json::json;
use shared_types::{Proposal, Vote};
use uuid::Uuid;

use crate::domain::tally::TallyResult;

/// Body for a `ProposalOpened` event.
#[must_use]
pub fn proposal_opened(proposal: &Proposal, occurred_at: DateTime<Utc>) -> String {
    json!({
        "proposalId": proposal.id,
        "organizationId": proposal.organization_id,
        "title": proposal.title,
        "eligibleVotingPower": proposal.eligible_voting_power,
        "startAt": proposal.start_at,
        "endAt": proposal.end_at,
        "occurredAt": occurred_at,
    })
    .to_string()
}

/// Body for a `ProposalClosed` event, carrying the tally.
#[must_use]
pub fn proposal_closed(
    proposal: &Proposal,
    tally: &TallyResult,
    occurred_at: DateTime<Utc>,
) -> String {
    json!({
        "proposalId": proposal.id,
        "organizationId": proposal.organization_id,
        "title": proposal.title,
        "winningOptionId": tally.winning_option_id,
        "quorumMet": tally.quorum_met,
        "totalVotesCast": tally.total_votes_cast,
        "optionTallies": tally.option_tallies,
        "occurredAt": occurred_at,
    })
    .to_string()
}

/// Body for a `ProposalFinalized` event.
#[must_use]
pub fn proposal_finalized(proposal: &Proposal, occurred_at: DateTime<Utc>) -> String {
    json!({
        "proposalId": proposal.id,
        "organizationId": proposal.organization_id,
        "title": proposal.title,
        "winningOptionId": proposal.winning_option_id,
        "quorumMet": proposal.quorum_met,
        "occurredAt": occurred_at,
    })
    .to_string()
}

/// Body for a `VoteCast` event.
#[must_use]
pub fn vote_cast(vote: &Vote, organization_id: Uuid, occurred_at: DateTime<Utc>) -> String {
    json!({
        "voteId": vote.id,
        "proposalId": vote.proposal_id,
        "organizationId": organization_id,
        "optionId": vote.option_id,
        "userId": vote.user_id,
        "votingPower": vote.voting_power,
        "occurredAt": occurred_at,
    })
    .to_string()
}
