//! # Core Governance Entities
//!
//! Defines the proposal/vote side of the domain model.
//!
//! ## Clusters
//!
//! - **Tenancy**: `Organization`
//! - **Proposals**: `Proposal`, `ProposalStatus`, `ProposalOption`
//! - **Voting**: `Vote`, `ShareBalance`

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// CLUSTER A: TENANCY
// =============================================================================

/// A tenant of the platform. Proposals, share balances, and webhook
/// endpoints are all scoped to exactly one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// When the organization was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// CLUSTER B: PROPOSALS
// =============================================================================

/// Lifecycle state of a proposal.
///
/// Transitions are strictly monotonic: `Draft → Open → Closed → Finalized`.
/// No state is ever skipped and no transition ever runs backwards. The
/// engine enforces this; the variant order here encodes it for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Being authored; invisible to voters.
    Draft,
    /// Voting window is active.
    Open,
    /// Voting window has ended; results are computed.
    Closed,
    /// Results are ratified; the record is immutable.
    Finalized,
}

impl ProposalStatus {
    /// Returns true once the proposal can no longer accept votes.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProposalStatus::Closed | ProposalStatus::Finalized)
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProposalStatus::Draft => "Draft",
            ProposalStatus::Open => "Open",
            ProposalStatus::Closed => "Closed",
            ProposalStatus::Finalized => "Finalized",
        };
        write!(f, "{s}")
    }
}

/// A governance proposal.
///
/// Tally fields (`winning_option_id`, `quorum_met`, `total_votes_cast`,
/// `closed_at`) are written exactly once, when the proposal closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Human-readable title.
    pub title: String,
    /// Current lifecycle state.
    pub status: ProposalStatus,
    /// Scheduled opening time; the scheduler opens the proposal once this
    /// passes. `None` means the proposal is opened manually.
    pub start_at: Option<DateTime<Utc>>,
    /// Scheduled closing time; the scheduler closes the proposal once this
    /// passes. `None` means the proposal is closed manually.
    pub end_at: Option<DateTime<Utc>>,
    /// Fraction of eligible voting power (0 to 1) that must be cast for
    /// the result to meet quorum.
    pub quorum_requirement: Decimal,
    /// Total voting power eligible to participate, snapshotted when the
    /// proposal opens.
    pub eligible_voting_power: Decimal,
    /// Winning option, if any votes were cast. Set at close.
    pub winning_option_id: Option<Uuid>,
    /// Whether cast power met the quorum requirement. Set at close.
    pub quorum_met: bool,
    /// Total voting power cast. Set at close.
    pub total_votes_cast: Decimal,
    /// When the proposal closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// When the proposal was created.
    pub created_at: DateTime<Utc>,
    /// Stamped on every mutation.
    pub updated_at: DateTime<Utc>,
}

impl Proposal {
    /// Creates a new draft with no schedule and no quorum requirement.
    #[must_use]
    pub fn draft(
        organization_id: Uuid,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            title: title.into(),
            status: ProposalStatus::Draft,
            start_at: None,
            end_at: None,
            quorum_requirement: Decimal::ZERO,
            eligible_voting_power: Decimal::ZERO,
            winning_option_id: None,
            quorum_met: false,
            total_votes_cast: Decimal::ZERO,
            closed_at: None,
            created_at,
            updated_at: created_at,
        }
    }
}

/// One selectable option on a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalOption {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning proposal.
    pub proposal_id: Uuid,
    /// Display label.
    pub label: String,
    /// Creation order within the proposal, starting at 0. Ties in the
    /// tally are broken in favor of the lowest position.
    pub position: u32,
}

impl ProposalOption {
    /// Creates an option at the given creation position.
    #[must_use]
    pub fn new(proposal_id: Uuid, label: impl Into<String>, position: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            proposal_id,
            label: label.into(),
            position,
        }
    }
}

// =============================================================================
// CLUSTER C: VOTING
// =============================================================================

/// A cast ballot. Immutable once persisted; at most one per
/// (proposal, user) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    /// Unique identifier.
    pub id: Uuid,
    /// Proposal the vote belongs to.
    pub proposal_id: Uuid,
    /// Option the voter selected.
    pub option_id: Uuid,
    /// The voter.
    pub user_id: Uuid,
    /// Voting power snapshotted at cast time. Later share transfers do
    /// not change it.
    pub voting_power: Decimal,
    /// When the vote was cast.
    pub cast_at: DateTime<Utc>,
}

impl Vote {
    /// Creates a vote with a fresh id.
    #[must_use]
    pub fn new(
        proposal_id: Uuid,
        option_id: Uuid,
        user_id: Uuid,
        voting_power: Decimal,
        cast_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            proposal_id,
            option_id,
            user_id,
            voting_power,
            cast_at,
        }
    }
}

/// A user's holding in one share class, with the class's voting weight
/// already resolved onto the row by the store query.
///
/// Voting power of a user is `Σ quantity × voting_weight` over their
/// balances in the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareBalance {
    /// The holder.
    pub user_id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Share class this balance is held in.
    pub share_class_id: Uuid,
    /// Number of shares held.
    pub quantity: Decimal,
    /// Voting weight per share of this class.
    pub voting_weight: Decimal,
}
