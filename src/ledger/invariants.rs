//! Whole-state consistency checks used by the ledger tests.

use std::collections::BTreeSet;

use super::Ledger;
use crate::types::{Address, Amount};

/// Running total equals the sum of every contributor's amount.
pub fn assert_total_matches_contributors(ledger: &Ledger) {
    let sum: Amount = ledger.contributors.values().map(|c| c.amount).sum();
    assert_eq!(
        ledger.total, sum,
        "total {} does not match contributor sum {}",
        ledger.total, sum
    );
}

/// Record store and enumeration order hold the same, unique addresses.
pub fn assert_order_matches_index(ledger: &Ledger) {
    let unique: BTreeSet<&Address> = ledger.order.iter().collect();
    assert_eq!(unique.len(), ledger.order.len(), "duplicate address in donor order");
    assert_eq!(ledger.order.len(), ledger.contributors.len());
    for address in &ledger.order {
        assert!(ledger.contributors.contains_key(address), "{address} missing from index");
    }
}

/// Leaderboard rows mirror the record store, are sorted, bounded, and hold
/// the true top amounts.
pub fn assert_leaderboard_is_top_k(ledger: &Ledger) {
    let board = ledger.leaderboard.standings();
    let capacity = ledger.leaderboard.capacity();

    for standing in board {
        assert_eq!(
            ledger.donation(&standing.address),
            standing.amount,
            "leaderboard amount for {} is stale",
            standing.address
        );
    }
    assert!(board.windows(2).all(|w| w[0].amount >= w[1].amount), "leaderboard not sorted");
    assert_eq!(board.len(), ledger.contributors.len().min(capacity));

    let mut brute: Vec<Amount> = ledger.contributors.values().map(|c| c.amount).collect();
    brute.sort_unstable_by(|a, b| b.cmp(a));
    brute.truncate(capacity);
    let on_board: Vec<Amount> = board.iter().map(|s| s.amount).collect();
    assert_eq!(on_board, brute, "leaderboard differs from brute-force ranking");

    if let Some(floor) = ledger.leaderboard.floor() {
        let listed: BTreeSet<Address> = board.iter().map(|s| s.address).collect();
        for contributor in ledger.contributors.values() {
            if !listed.contains(&contributor.address) {
                assert!(contributor.amount <= floor, "{} outranks the board", contributor.address);
            }
        }
    }
}

/// Cursor sits on the first threshold above the running total.
pub fn assert_milestone_cursor(ledger: &Ledger) {
    let expected = ledger
        .milestones
        .thresholds()
        .iter()
        .position(|&t| t > ledger.total)
        .unwrap_or(ledger.milestones.thresholds().len());
    assert_eq!(ledger.milestones.reached(), expected);
}

pub fn assert_all_invariants(ledger: &Ledger) {
    assert_total_matches_contributors(ledger);
    assert_order_matches_index(ledger);
    assert_leaderboard_is_top_k(ledger);
    assert_milestone_cursor(ledger);
}
