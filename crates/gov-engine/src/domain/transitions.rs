//! Lifecycle transition validation.
//!
//! The status machine is strictly monotonic. Each `validate_can_*`
//! function checks exactly one edge; callers re-fetch the proposal
//! immediately before validating so a stale candidate (already advanced
//! by another caller) is rejected here instead of being double-processed.

use chrono::{DateTime, Utc};
use shared_types::{Proposal, ProposalStatus};

use crate::error::GovernanceError;

/// A Draft proposal may open.
pub fn validate_can_open(proposal: &Proposal) -> Result<(), GovernanceError> {
    expect_status(proposal, ProposalStatus::Draft, ProposalStatus::Open)
}

/// An Open proposal may close.
pub fn validate_can_close(proposal: &Proposal) -> Result<(), GovernanceError> {
    expect_status(proposal, ProposalStatus::Open, ProposalStatus::Closed)
}

/// A Closed proposal may finalize.
pub fn validate_can_finalize(proposal: &Proposal) -> Result<(), GovernanceError> {
    expect_status(proposal, ProposalStatus::Closed, ProposalStatus::Finalized)
}

/// A vote is accepted only while the proposal is Open and the user has
/// not voted yet.
pub fn validate_can_vote(
    proposal: &Proposal,
    user_id: uuid::Uuid,
    has_already_voted: bool,
) -> Result<(), GovernanceError> {
    if proposal.status != ProposalStatus::Open {
        return Err(GovernanceError::VotingNotOpen {
            status: proposal.status,
        });
    }
    if has_already_voted {
        return Err(GovernanceError::AlreadyVoted {
            proposal_id: proposal.id,
            user_id,
        });
    }
    Ok(())
}

/// Proposal fields, the voting window included, may only change while
/// the proposal is a Draft.
pub fn validate_editable(proposal: &Proposal) -> Result<(), GovernanceError> {
    if proposal.status != ProposalStatus::Draft {
        return Err(GovernanceError::NotEditable {
            status: proposal.status,
        });
    }
    Ok(())
}

/// A voting window must start before it ends.
pub fn validate_schedule(
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
) -> Result<(), GovernanceError> {
    if start_at >= end_at {
        return Err(GovernanceError::InvalidSchedule { start_at, end_at });
    }
    Ok(())
}

fn expect_status(
    proposal: &Proposal,
    required: ProposalStatus,
    target: ProposalStatus,
) -> Result<(), GovernanceError> {
    if proposal.status == required {
        Ok(())
    } else {
        Err(GovernanceError::InvalidTransition {
            from: proposal.status,
            to: target,
        })
    }
}
