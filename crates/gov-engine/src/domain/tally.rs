//! Deterministic tally computation.
//!
//! Run once, at close time, over the full set of votes. The result is a
//! pure function of its inputs: re-running the tally over the same rows
//! always produces the same winner, which is what makes the close
//! transition safe to retry after a failed persist.

use rust_decimal::Decimal;
use serde::Serialize;
use shared_types::{Proposal, ProposalOption, Vote};
use uuid::Uuid;

/// Summed voting power for one option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    /// The option.
    pub option_id: Uuid,
    /// Total voting power cast for it.
    pub voting_power: Decimal,
}

/// Outcome of [`compute_results`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyResult {
    /// Winning option, `None` when no votes were cast.
    pub winning_option_id: Option<Uuid>,
    /// Per-option totals, ordered by option creation position.
    pub option_tallies: Vec<OptionTally>,
    /// Total voting power cast across all options.
    pub total_votes_cast: Decimal,
    /// Whether cast power reached the quorum requirement.
    pub quorum_met: bool,
}

/// Computes the result of a proposal from its options and votes.
///
/// - Voting power is summed per option; the winner is the option with the
///   maximum total. Ties break to the option with the lowest creation
///   position, so the outcome never depends on iteration order.
/// - When nothing was cast there is no winner.
/// - Quorum: `total cast / eligible snapshot ≥ requirement`. A proposal
///   whose eligible power snapshot is zero never meets quorum; the ratio
///   is not evaluated in that case.
#[must_use]
pub fn compute_results(
    proposal: &Proposal,
    options: &[ProposalOption],
    votes: &[Vote],
) -> TallyResult {
    let mut ordered: Vec<&ProposalOption> = options.iter().collect();
    ordered.sort_by_key(|o| o.position);

    let option_tallies: Vec<OptionTally> = ordered
        .iter()
        .map(|option| OptionTally {
            option_id: option.id,
            voting_power: votes
                .iter()
                .filter(|v| v.option_id == option.id)
                .map(|v| v.voting_power)
                .sum(),
        })
        .collect();

    let total_votes_cast: Decimal = votes.iter().map(|v| v.voting_power).sum();

    // Strictly-greater scan in position order, so a tie keeps the
    // earliest-created option.
    let winning_option_id = if total_votes_cast.is_zero() {
        None
    } else {
        let mut best: Option<&OptionTally> = None;
        for tally in &option_tallies {
            if best.is_none_or(|b| tally.voting_power > b.voting_power) {
                best = Some(tally);
            }
        }
        best.map(|t| t.option_id)
    };

    let quorum_met = if proposal.eligible_voting_power.is_zero() {
        false
    } else {
        total_votes_cast / proposal.eligible_voting_power >= proposal.quorum_requirement
    };

    TallyResult {
        winning_option_id,
        option_tallies,
        total_votes_cast,
        quorum_met,
    }
}
