//! Voting power aggregation.

use rust_decimal::Decimal;
use shared_types::ShareBalance;

/// Sums voting power over a set of share balances: `quantity × weight`
/// per row. The same formula serves both a single voter's power (their
/// balances) and the eligible-power snapshot (every balance in the
/// organization).
#[must_use]
pub fn calculate_voting_power(balances: &[ShareBalance]) -> Decimal {
    balances
        .iter()
        .map(|b| b.quantity * b.voting_weight)
        .sum()
}
