//! Error types for the governance engine.
//!
//! Two layers, two types: [`GovernanceError`] is the pure domain's verdict
//! on an invalid request, [`CommandError`] is what the command layer hands
//! back once persistence is in the picture.

use chrono::{DateTime, Utc};
use shared_store::StoreError;
use shared_types::ProposalStatus;
use thiserror::Error;
use uuid::Uuid;

/// A request that violates governance rules.
///
/// These are terminal verdicts about the request itself. Retrying the
/// identical request can never succeed, so callers log and skip; nothing
/// in this enum is an I/O failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GovernanceError {
    /// The proposal is not in the state the transition requires.
    #[error("invalid transition to {to}: proposal is {from}")]
    InvalidTransition {
        /// Status the proposal is actually in.
        from: ProposalStatus,
        /// Status the caller asked for.
        to: ProposalStatus,
    },

    /// Proposal fields may only change while the proposal is a Draft.
    #[error("proposal is not editable: proposal is {status}")]
    NotEditable {
        /// Status the proposal is actually in.
        status: ProposalStatus,
    },

    /// Votes are only accepted while the proposal is Open.
    #[error("voting is not open: proposal is {status}")]
    VotingNotOpen {
        /// Status the proposal is actually in.
        status: ProposalStatus,
    },

    /// The user has already voted on this proposal.
    #[error("user {user_id} already voted on proposal {proposal_id}")]
    AlreadyVoted {
        /// Proposal being voted on.
        proposal_id: Uuid,
        /// The duplicate voter.
        user_id: Uuid,
    },

    /// The selected option does not belong to the proposal.
    #[error("option {option_id} does not belong to proposal {proposal_id}")]
    UnknownOption {
        /// Proposal being voted on.
        proposal_id: Uuid,
        /// The stray option id.
        option_id: Uuid,
    },

    /// The voter holds no voting power in the organization.
    #[error("user {user_id} has no voting power")]
    NoVotingPower {
        /// The powerless voter.
        user_id: Uuid,
    },

    /// A voting window whose start does not precede its end.
    #[error("invalid schedule: start {start_at} must precede end {end_at}")]
    InvalidSchedule {
        /// Proposed opening time.
        start_at: DateTime<Utc>,
        /// Proposed closing time.
        end_at: DateTime<Utc>,
    },
}

/// Failure of a command-layer operation.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The request was rejected by governance rules. Never retried.
    #[error(transparent)]
    Validation(#[from] GovernanceError),

    /// The durable store failed. The caller's next poll retries.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CommandError {
    /// True when the failure is a rule violation rather than an I/O
    /// problem. Loops use this to pick between skip-forever and
    /// retry-next-tick handling.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, CommandError::Validation(_))
    }
}
