use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{self, Amount, BASE_UNITS_PER_UNIT};

/// Contributor rank derived from cumulative contribution.
///
/// Variant order is the rank order, so `Ord` compares tiers directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum BadgeTier {
    #[default]
    None,
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl BadgeTier {
    pub const ALL: [BadgeTier; 5] = [
        BadgeTier::None,
        BadgeTier::Bronze,
        BadgeTier::Silver,
        BadgeTier::Gold,
        BadgeTier::Diamond,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Diamond => "Diamond",
        }
    }

    /// Numeric encoding used in event payloads (0 = None … 4 = Diamond).
    pub fn index(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for BadgeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum cumulative amounts for each tier above `None`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierTable {
    #[serde(with = "types::units")]
    pub bronze: Amount,
    #[serde(with = "types::units")]
    pub silver: Amount,
    #[serde(with = "types::units")]
    pub gold: Amount,
    #[serde(with = "types::units")]
    pub diamond: Amount,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            bronze: BASE_UNITS_PER_UNIT / 10,
            silver: BASE_UNITS_PER_UNIT / 2,
            gold: BASE_UNITS_PER_UNIT,
            diamond: 5 * BASE_UNITS_PER_UNIT,
        }
    }
}

impl TierTable {
    /// Thresholds paired with the tier they unlock, highest first.
    fn descending(&self) -> [(Amount, BadgeTier); 4] {
        [
            (self.diamond, BadgeTier::Diamond),
            (self.gold, BadgeTier::Gold),
            (self.silver, BadgeTier::Silver),
            (self.bronze, BadgeTier::Bronze),
        ]
    }

    pub fn is_ascending(&self) -> bool {
        self.bronze > 0
            && self.bronze < self.silver
            && self.silver < self.gold
            && self.gold < self.diamond
    }

    pub fn tier_of(&self, amount: Amount) -> BadgeTier {
        self.descending()
            .into_iter()
            .find(|(threshold, _)| amount >= *threshold)
            .map(|(_, tier)| tier)
            .unwrap_or(BadgeTier::None)
    }

    /// Threshold that unlocks `tier`; `None` is reached at zero.
    pub fn threshold(&self, tier: BadgeTier) -> Amount {
        match tier {
            BadgeTier::None => 0,
            BadgeTier::Bronze => self.bronze,
            BadgeTier::Silver => self.silver,
            BadgeTier::Gold => self.gold,
            BadgeTier::Diamond => self.diamond,
        }
    }
}
