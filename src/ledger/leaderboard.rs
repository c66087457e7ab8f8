//! Bounded top-K view of contributors, maintained incrementally.
//!
//! Every contribution touches at most one entry, so an update costs
//! O(capacity) no matter how many contributors the ledger holds. Entries are
//! kept sorted by amount, descending; among equal amounts the entry that got
//! there first stays ahead.

use serde::{Deserialize, Serialize};

use crate::types::{self, Address, Amount};

pub const DEFAULT_CAPACITY: usize = 5;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Standing {
    pub address: Address,
    #[serde(with = "types::units")]
    pub amount: Amount,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Leaderboard {
    capacity: usize,
    entries: Vec<Standing>,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Leaderboard {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn standings(&self) -> &[Standing] {
        &self.entries
    }

    pub fn position(&self, address: &Address) -> Option<usize> {
        self.entries.iter().position(|s| s.address == *address)
    }

    /// Smallest amount currently on the board.
    pub fn floor(&self) -> Option<Amount> {
        self.entries.last().map(|s| s.amount)
    }

    /// Apply a contributor's new cumulative amount. Amounts only ever grow,
    /// so an entry already on the board can only move up.
    pub fn record(&mut self, address: Address, amount: Amount) {
        if self.capacity == 0 {
            return;
        }

        if let Some(mut idx) = self.position(&address) {
            self.entries[idx].amount = amount;
            while idx > 0 && self.entries[idx - 1].amount < amount {
                self.entries.swap(idx - 1, idx);
                idx -= 1;
            }
            return;
        }

        if self.entries.len() >= self.capacity {
            match self.floor() {
                Some(floor) if amount > floor => {
                    self.entries.pop();
                }
                _ => return,
            }
        }

        // after every equal amount, so earlier arrivals keep priority
        let at = self
            .entries
            .iter()
            .position(|s| s.amount < amount)
            .unwrap_or(self.entries.len());
        self.entries.insert(at, Standing { address, amount });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    fn order(board: &Leaderboard) -> Vec<u8> {
        board.standings().iter().map(|s| s.address.as_bytes()[0]).collect()
    }

    #[test]
    fn inserts_in_descending_order() {
        let mut board = Leaderboard::default();
        board.record(addr(1), 20);
        board.record(addr(2), 15);
        board.record(addr(3), 30);
        assert_eq!(order(&board), vec![3, 1, 2]);
        let amounts: Vec<_> = board.standings().iter().map(|s| s.amount).collect();
        assert_eq!(amounts, vec![30, 20, 15]);
    }

    #[test]
    fn existing_entry_moves_up_in_place() {
        let mut board = Leaderboard::default();
        for (n, amount) in [(1, 50), (2, 40), (3, 30), (4, 20)] {
            board.record(addr(n), amount);
        }
        board.record(addr(4), 45);
        assert_eq!(order(&board), vec![1, 4, 2, 3]);
        assert_eq!(board.len(), 4);
    }

    #[test]
    fn full_board_evicts_floor_only_when_strictly_exceeded() {
        let mut board = Leaderboard::default();
        for n in 1..=5u8 {
            board.record(addr(n), 10 * n as u128);
        }
        assert_eq!(board.floor(), Some(10));

        // equal to the floor: first arrival keeps its slot
        board.record(addr(6), 10);
        assert_eq!(board.position(&addr(6)), None);
        assert_eq!(board.len(), 5);

        board.record(addr(7), 25);
        assert_eq!(board.len(), 5);
        assert_eq!(board.position(&addr(1)), None);
        assert_eq!(order(&board), vec![5, 4, 3, 7, 2]);
    }

    #[test]
    fn ties_keep_earlier_arrival_ahead() {
        let mut board = Leaderboard::default();
        board.record(addr(1), 10);
        board.record(addr(2), 10);
        board.record(addr(3), 5);
        board.record(addr(3), 10);
        assert_eq!(order(&board), vec![1, 2, 3]);
    }

    #[test]
    fn zero_capacity_board_stays_empty() {
        let mut board = Leaderboard::with_capacity(0);
        board.record(addr(1), 10);
        assert!(board.is_empty());
    }
}
