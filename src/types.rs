//! Identity and amount primitives shared by every ledger module.
//!
//! Amounts are integers in base units (`10^18` per whole unit), so the ledger
//! never touches floating point. The text form of an amount is an exact
//! decimal string such as `"2.5"`.

use std::fmt;
use std::str::FromStr;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub type Amount = u128;

pub const ADDRESS_LEN: usize = 20;
pub const UNIT_DECIMALS: usize = 18;
pub const BASE_UNITS_PER_UNIT: Amount = 1_000_000_000_000_000_000; // 1 unit = 1e18 base units

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid address {0:?}: expected 20 bytes as 40 hex digits")]
    Address(String),
    #[error("invalid amount {0:?}")]
    Amount(String),
}

/// Opaque fixed-width contributor identity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Abbreviated `0x1234…abcd` form for tables.
    pub fn short(&self) -> String {
        let full = self.to_string();
        format!("{}…{}", &full[..6], &full[full.len() - 4..])
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|_| ParseError::Address(s.to_string()))?;
        let bytes: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| ParseError::Address(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        encoded.parse().map_err(D::Error::custom)
    }
}

/// Parse a decimal unit string (`"0.15"`, `"3"`) into base units exactly.
pub fn parse_units(s: &str) -> Result<Amount, ParseError> {
    let err = || ParseError::Amount(s.to_string());
    let s = s.trim();
    let (whole, frac) = match s.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(err());
    }
    if frac.len() > UNIT_DECIMALS {
        return Err(err());
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(err());
    }

    let whole: Amount = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| err())?
    };
    let mut frac_units: Amount = 0;
    if !frac.is_empty() {
        let padded = format!("{frac:0<width$}", width = UNIT_DECIMALS);
        frac_units = padded.parse().map_err(|_| err())?;
    }

    whole
        .checked_mul(BASE_UNITS_PER_UNIT)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(err)
}

/// Inverse of [`parse_units`]; trailing fractional zeros are dropped.
pub fn format_units(amount: Amount) -> String {
    let whole = amount / BASE_UNITS_PER_UNIT;
    let frac = amount % BASE_UNITS_PER_UNIT;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0>width$}", width = UNIT_DECIMALS);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Serde adapter that writes amounts as decimal unit strings.
pub mod units {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::{format_units, parse_units, Amount};

    pub fn serialize<S>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_units(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Amount, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        parse_units(&encoded).map_err(D::Error::custom)
    }

    pub mod vec {
        use serde::{de::Error, ser::SerializeSeq, Deserialize, Deserializer, Serializer};

        use super::super::{format_units, parse_units, Amount};

        pub fn serialize<S>(values: &[Amount], serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let mut seq = serializer.serialize_seq(Some(values.len()))?;
            for value in values {
                seq.serialize_element(&format_units(*value))?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Amount>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Vec::<String>::deserialize(deserializer)?
                .iter()
                .map(|s| parse_units(s).map_err(D::Error::custom))
                .collect()
        }
    }
}
