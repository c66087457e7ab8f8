//! Thread-safe handle around a [`Ledger`].
//!
//! Contributions are serialized behind the write lock, so a reader holding the
//! read lock always sees the state after some whole prefix of contributions.

use std::sync::{Arc, PoisonError, RwLock};

use super::{Ledger, LedgerError, Receipt};
use crate::types::{Address, Amount};

#[derive(Clone, Debug, Default)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    pub fn contribute(&self, address: Address, amount: Amount) -> Result<Receipt, LedgerError> {
        // contribute validates before mutating and never panics midway, so a
        // poisoned lock still guards a whole state
        let mut ledger = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        ledger.contribute(address, amount)
    }

    /// Run `f` against one consistent view of the ledger.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        let ledger = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&ledger)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::ledger::invariants::assert_all_invariants;
    use crate::types::BASE_UNITS_PER_UNIT;

    #[test]
    fn concurrent_writers_and_readers_see_whole_states() {
        let shared = SharedLedger::default();
        let per_writer = 200u128;
        let writers = 4u8;

        thread::scope(|scope| {
            for w in 0..writers {
                let shared = shared.clone();
                scope.spawn(move || {
                    for i in 0..per_writer {
                        let address = Address::new([w * 16 + (i % 8) as u8; 20]);
                        shared
                            .contribute(address, (i + 1) * BASE_UNITS_PER_UNIT / 100)
                            .unwrap();
                    }
                });
            }
            for _ in 0..2 {
                let shared = shared.clone();
                scope.spawn(move || {
                    for _ in 0..100 {
                        shared.read(assert_all_invariants);
                    }
                });
            }
        });

        shared.read(|ledger| {
            assert_all_invariants(ledger);
            assert_eq!(ledger.height(), per_writer as u64 * writers as u64);
            assert_eq!(ledger.donor_count(), 8 * writers as usize);
            let per_writer_sum: u128 = (1..=per_writer).sum::<u128>() * BASE_UNITS_PER_UNIT / 100;
            assert_eq!(ledger.total_donations(), per_writer_sum * writers as u128);
        });
    }

    #[test]
    fn rejected_contribution_leaves_shared_state_alone() {
        let shared = SharedLedger::default();
        let address = Address::new([1; 20]);
        assert_eq!(shared.contribute(address, 0), Err(LedgerError::InvalidAmount));
        assert_eq!(shared.read(|l| l.donor_count()), 0);
    }
}
