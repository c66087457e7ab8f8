//! Donation ledger with badge tiers, milestones and a top-donor leaderboard.
//!
//! The crate is built around one state machine, [`Ledger`]:
//!
//! * [`Ledger::contribute`] is the only mutation. It credits the contributor
//!   and the running total, recomputes the contributor's [`BadgeTier`],
//!   advances the milestone cursor and updates the bounded leaderboard, then
//!   hands back a [`Receipt`] holding the emitted [`LedgerEvent`]s.
//! * Everything else (`donation`, `donor_count`, `all_donors`,
//!   `contract_balance`, `next_milestone`, `donor_badge_string`,
//!   `top_donors`) is a read that never changes state.
//!
//! [`SharedLedger`] wraps a ledger for use from several threads, and the
//! [`journal`] module replays JSON-lines contribution logs.

pub mod badges;
pub mod config;
pub mod journal;
pub mod ledger;
pub mod types;

pub use badges::{BadgeTier, TierTable};
pub use config::{ConfigError, LedgerConfig};
pub use ledger::leaderboard::{Leaderboard, Standing};
pub use ledger::milestones::NextMilestone;
pub use ledger::shared::SharedLedger;
pub use ledger::{Contributor, Ledger, LedgerError, LedgerEvent, LedgerSnapshot, Receipt, TopDonors};
pub use types::{format_units, parse_units, Address, Amount, ParseError, BASE_UNITS_PER_UNIT};
