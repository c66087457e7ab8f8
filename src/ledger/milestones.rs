use serde::{Deserialize, Serialize};

use crate::types::Amount;

/// Fixed, strictly increasing thresholds plus the index of the next
/// unreached one.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MilestoneSchedule {
    thresholds: Vec<Amount>,
    cursor: usize,
}

impl MilestoneSchedule {
    /// Caller guarantees `thresholds` is strictly increasing and positive
    /// (see `LedgerConfig::validate`).
    pub fn new(thresholds: Vec<Amount>) -> Self {
        Self {
            thresholds,
            cursor: 0,
        }
    }

    pub fn thresholds(&self) -> &[Amount] {
        &self.thresholds
    }

    pub fn reached(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.thresholds.len()
    }

    /// Next unreached threshold, or `0` once every milestone is reached.
    pub fn next_threshold(&self) -> Amount {
        self.thresholds.get(self.cursor).copied().unwrap_or(0)
    }

    /// Move the cursor past every threshold `<= total` and return the crossed
    /// thresholds in ascending order.
    pub fn advance(&mut self, total: Amount) -> Vec<Amount> {
        let mut crossed = Vec::new();
        while let Some(&threshold) = self.thresholds.get(self.cursor) {
            if threshold > total {
                break;
            }
            crossed.push(threshold);
            self.cursor += 1;
        }
        crossed
    }
}

/// `getNextMilestone` view: the pending threshold (zero when exhausted) and
/// the running total.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NextMilestone {
    #[serde(with = "crate::types::units")]
    pub threshold: Amount,
    #[serde(with = "crate::types::units")]
    pub total: Amount,
}

impl NextMilestone {
    pub fn is_exhausted(&self) -> bool {
        self.threshold == 0
    }

    /// Progress toward `threshold` in basis points, capped at 10 000.
    pub fn progress_bps(&self) -> u32 {
        if self.is_exhausted() {
            return 10_000;
        }
        if self.total >= self.threshold {
            return 10_000;
        }
        // total < threshold here, so the fallback divisor is non-zero whenever
        // the multiplication overflows
        let bps = match self.total.checked_mul(10_000) {
            Some(scaled) => scaled / self.threshold,
            None => self.total / (self.threshold / 10_000),
        };
        bps.min(10_000) as u32
    }

    pub fn remaining(&self) -> Amount {
        self.threshold.saturating_sub(self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_crosses_each_threshold_once() {
        let mut schedule = MilestoneSchedule::new(vec![10, 20, 30]);
        assert!(schedule.advance(9).is_empty());
        assert_eq!(schedule.advance(10), vec![10]);
        assert!(schedule.advance(10).is_empty());
        assert_eq!(schedule.reached(), 1);
        assert_eq!(schedule.next_threshold(), 20);
    }

    #[test]
    fn advance_reports_multiple_crossings_in_order() {
        let mut schedule = MilestoneSchedule::new(vec![10, 20, 30, 40]);
        assert_eq!(schedule.advance(35), vec![10, 20, 30]);
        assert_eq!(schedule.next_threshold(), 40);
        assert_eq!(schedule.advance(1_000), vec![40]);
        assert!(schedule.is_exhausted());
        assert_eq!(schedule.next_threshold(), 0);
        assert!(schedule.advance(u128::MAX).is_empty());
    }

    #[test]
    fn empty_schedule_is_exhausted_from_the_start() {
        let mut schedule = MilestoneSchedule::new(Vec::new());
        assert!(schedule.is_exhausted());
        assert!(schedule.advance(5).is_empty());
        assert_eq!(schedule.next_threshold(), 0);
    }

    #[test]
    fn progress_in_basis_points() {
        let next = NextMilestone { threshold: 10, total: 5 };
        assert_eq!(next.progress_bps(), 5_000);
        assert_eq!(next.remaining(), 5);
        let done = NextMilestone { threshold: 0, total: 99 };
        assert!(done.is_exhausted());
        assert_eq!(done.progress_bps(), 10_000);
        assert_eq!(done.remaining(), 0);
        let over = NextMilestone { threshold: 10, total: 25 };
        assert_eq!(over.progress_bps(), 10_000);
    }

    #[test]
    fn progress_stays_accurate_near_the_amount_ceiling() {
        let next = NextMilestone {
            threshold: u128::MAX / 2,
            total: u128::MAX / 3,
        };
        let bps = next.progress_bps();
        assert!((6_666..=6_667).contains(&bps), "got {bps}");
    }
}
