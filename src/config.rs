//! Ledger configuration: milestone schedule, badge thresholds and leaderboard
//! size. Loaded from a JSON file whose amounts are decimal unit strings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::badges::TierTable;
use crate::ledger::leaderboard::DEFAULT_CAPACITY;
use crate::types::{self, Amount, BASE_UNITS_PER_UNIT};

/// Environment variable naming an optional config file.
pub const CONFIG_ENV: &str = "DONATION_BOX_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Cumulative totals whose crossing emits `MilestoneReached`.
    #[serde(with = "types::units::vec")]
    pub milestones: Vec<Amount>,
    pub tiers: TierTable,
    pub leaderboard_capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            milestones: [1, 5, 10, 25, 50]
                .into_iter()
                .map(|units| units * BASE_UNITS_PER_UNIT)
                .collect(),
            tiers: TierTable::default(),
            leaderboard_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl LedgerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Read the file named by `DONATION_BOX_CONFIG`, or fall back to defaults
    /// when the variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_path(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.milestones.first() == Some(&0) {
            return Err(ConfigError::Invalid("milestones must be positive".into()));
        }
        if self.milestones.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Invalid(
                "milestones must be strictly increasing".into(),
            ));
        }
        if !self.tiers.is_ascending() {
            return Err(ConfigError::Invalid(
                "badge thresholds must be positive and strictly ascending".into(),
            ));
        }
        if self.leaderboard_capacity == 0 {
            return Err(ConfigError::Invalid(
                "leaderboard_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_units;

    #[test]
    fn default_config_is_valid() {
        let config = LedgerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.milestones.len(), 5);
        assert_eq!(config.milestones[0], BASE_UNITS_PER_UNIT);
        assert_eq!(config.leaderboard_capacity, 5);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = LedgerConfig::from_json(r#"{"milestones":["0.5","2","7.25"]}"#).unwrap();
        assert_eq!(
            config.milestones,
            vec![
                parse_units("0.5").unwrap(),
                parse_units("2").unwrap(),
                parse_units("7.25").unwrap()
            ]
        );
        assert_eq!(config.tiers, TierTable::default());
        assert_eq!(config.leaderboard_capacity, 5);
    }

    #[test]
    fn rejects_non_increasing_milestones() {
        let err = LedgerConfig::from_json(r#"{"milestones":["1","1"]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = LedgerConfig::from_json(r#"{"milestones":["0","1"]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_capacity_and_unknown_fields() {
        assert!(matches!(
            LedgerConfig::from_json(r#"{"leaderboard_capacity":0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            LedgerConfig::from_json(r#"{"owner":"0x00"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn serialized_config_reads_back() {
        let config = LedgerConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"0.1\""));
        assert_eq!(LedgerConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = LedgerConfig::from_path(Path::new("/nonexistent/donation-box.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/donation-box.json"));
    }
}
