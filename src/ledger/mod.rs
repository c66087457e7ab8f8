use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::badges::{BadgeTier, TierTable};
use crate::config::{ConfigError, LedgerConfig};
use crate::types::{self, format_units, Address, Amount};

pub mod leaderboard;
pub mod milestones;
pub mod shared;

#[cfg(test)]
mod invariants;

use leaderboard::{Leaderboard, Standing};
use milestones::{MilestoneSchedule, NextMilestone};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("contribution amount must be greater than zero")]
    InvalidAmount,
    #[error("contribution of {amount} base units would overflow total {total}")]
    AmountOverflow { total: Amount, amount: Amount },
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contributor {
    pub address: Address,
    #[serde(with = "types::units")]
    pub amount: Amount,
}

/// Notifications produced by a contribution, in emission order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    BadgeAwarded {
        address: Address,
        tier: BadgeTier,
    },
    DonationMade {
        address: Address,
        #[serde(with = "types::units")]
        amount: Amount,
        tier: BadgeTier,
    },
    MilestoneReached {
        #[serde(with = "types::units")]
        threshold: Amount,
        #[serde(with = "types::units")]
        total: Amount,
    },
}

/// Outcome of an accepted contribution.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Receipt {
    pub address: Address,
    /// Amount contributed by this call.
    #[serde(with = "types::units")]
    pub amount: Amount,
    /// Contributor's cumulative amount after this contribution.
    #[serde(with = "types::units")]
    pub total: Amount,
    pub tier: BadgeTier,
    pub events: Vec<LedgerEvent>,
}

/// Parallel `(addresses, amounts, badges)` view of the leaderboard.
#[derive(Clone, Debug, Serialize, PartialEq, Eq, Default)]
pub struct TopDonors {
    pub addresses: Vec<Address>,
    #[serde(with = "types::units::vec")]
    pub amounts: Vec<Amount>,
    pub badges: Vec<&'static str>,
}

impl TopDonors {
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub height: u64,
    #[serde(with = "types::units")]
    pub total_contributed: Amount,
    pub donor_count: usize,
    pub milestones_reached: usize,
    pub next_milestone: NextMilestone,
    pub contributors: Vec<Contributor>,
    pub leaderboard: TopDonors,
    #[serde(with = "hex_root")]
    pub state_root: [u8; 32],
}

/// Donation ledger state machine.
///
/// `contribute` is the only mutation; it validates before touching state and
/// then applies balance, badge, milestone and leaderboard updates together.
#[derive(Clone, Debug)]
pub struct Ledger {
    tiers: TierTable,
    contributors: BTreeMap<Address, Contributor>,
    order: Vec<Address>,
    total: Amount,
    milestones: MilestoneSchedule,
    leaderboard: Leaderboard,
    height: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::with_validated(&LedgerConfig::default())
    }
}

impl Ledger {
    /// Start an empty ledger. Configs that fail [`LedgerConfig::validate`]
    /// are refused.
    pub fn new(config: &LedgerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_validated(config))
    }

    fn with_validated(config: &LedgerConfig) -> Self {
        Self {
            tiers: config.tiers.clone(),
            contributors: BTreeMap::new(),
            order: Vec::new(),
            total: 0,
            milestones: MilestoneSchedule::new(config.milestones.clone()),
            leaderboard: Leaderboard::with_capacity(config.leaderboard_capacity),
            height: 0,
        }
    }

    pub fn contribute(&mut self, address: Address, amount: Amount) -> Result<Receipt, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        // a record never exceeds the total, so checking the total covers both
        let total = self
            .total
            .checked_add(amount)
            .ok_or(LedgerError::AmountOverflow {
                total: self.total,
                amount,
            })?;

        let order = &mut self.order;
        let record = self.contributors.entry(address).or_insert_with(|| {
            order.push(address);
            Contributor { address, amount: 0 }
        });
        let previous = record.amount;
        record.amount += amount;
        let cumulative = record.amount;
        self.total = total;
        self.height += 1;

        let mut events = Vec::new();
        let previous_tier = self.tiers.tier_of(previous);
        let tier = self.tiers.tier_of(cumulative);
        if tier > previous_tier {
            info!(%address, %tier, "badge awarded");
            events.push(LedgerEvent::BadgeAwarded { address, tier });
        }
        events.push(LedgerEvent::DonationMade {
            address,
            amount,
            tier,
        });

        for threshold in self.milestones.advance(total) {
            info!(
                threshold = %format_units(threshold),
                total = %format_units(total),
                "milestone reached"
            );
            events.push(LedgerEvent::MilestoneReached { threshold, total });
        }

        self.leaderboard.record(address, cumulative);

        debug!(
            %address,
            amount = %format_units(amount),
            cumulative = %format_units(cumulative),
            height = self.height,
            "contribution applied"
        );

        Ok(Receipt {
            address,
            amount,
            total: cumulative,
            tier,
            events,
        })
    }

    // ── queries ──────────────────────────────────────────────────────

    pub fn donation(&self, address: &Address) -> Amount {
        self.contributors.get(address).map(|c| c.amount).unwrap_or(0)
    }

    pub fn contributor(&self, address: &Address) -> Option<&Contributor> {
        self.contributors.get(address)
    }

    pub fn donor_count(&self) -> usize {
        self.order.len()
    }

    /// Addresses in first-contribution order.
    pub fn all_donors(&self) -> Vec<Address> {
        self.order.clone()
    }

    /// Nothing is ever paid out, so the held balance is the running total.
    pub fn contract_balance(&self) -> Amount {
        self.total
    }

    pub fn total_donations(&self) -> Amount {
        self.total
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    pub fn milestones(&self) -> &[Amount] {
        self.milestones.thresholds()
    }

    pub fn milestones_reached(&self) -> usize {
        self.milestones.reached()
    }

    pub fn next_milestone(&self) -> NextMilestone {
        NextMilestone {
            threshold: self.milestones.next_threshold(),
            total: self.total,
        }
    }

    pub fn donor_badge(&self, address: &Address) -> BadgeTier {
        self.tiers.tier_of(self.donation(address))
    }

    pub fn donor_badge_string(&self, address: &Address) -> &'static str {
        self.donor_badge(address).as_str()
    }

    pub fn leaderboard(&self) -> &[Standing] {
        self.leaderboard.standings()
    }

    pub fn top_donors(&self) -> TopDonors {
        let standings = self.leaderboard.standings();
        TopDonors {
            addresses: standings.iter().map(|s| s.address).collect(),
            amounts: standings.iter().map(|s| s.amount).collect(),
            badges: standings
                .iter()
                .map(|s| self.tiers.tier_of(s.amount).as_str())
                .collect(),
        }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            height: self.height,
            total_contributed: self.total,
            donor_count: self.donor_count(),
            milestones_reached: self.milestones_reached(),
            next_milestone: self.next_milestone(),
            contributors: self
                .order
                .iter()
                .filter_map(|a| self.contributors.get(a).copied())
                .collect(),
            leaderboard: self.top_donors(),
            state_root: self.state_root(),
        }
    }

    /// SHA-256 commitment over contributors (address order), total and
    /// milestone cursor.
    pub fn state_root(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"donation-box-state-v1");
        for contributor in self.contributors.values() {
            hasher.update(contributor.address.as_bytes());
            hasher.update(contributor.amount.to_le_bytes());
        }
        hasher.update(self.total.to_le_bytes());
        hasher.update((self.milestones.reached() as u64).to_le_bytes());
        hasher.finalize().into()
    }
}

mod hex_root {
    use serde::Serializer;

    pub fn serialize<S>(value: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(value))
    }
}
