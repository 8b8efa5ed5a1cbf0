//! Configuration management for the scoring system.

use crate::weights::WeightSet;
use crate::{Error, Result};
use std::env;
use std::path::PathBuf;
use tracing::debug;

pub const KEY_WEIGHT_TX_SUCCESS: &str = "AGENTFICO_WEIGHT_TX_SUCCESS";
pub const KEY_WEIGHT_X402: &str = "AGENTFICO_WEIGHT_X402";
pub const KEY_WEIGHT_ERC8004: &str = "AGENTFICO_WEIGHT_ERC8004";
pub const KEY_ANALYSIS_DAYS: &str = "AGENTFICO_ANALYSIS_DAYS";
pub const KEY_CONFIG_PATH: &str = "AGENTFICO_CONFIG_PATH";
pub const KEY_LOCAL_CONFIG_PATH: &str = "AGENTFICO_LOCAL_CONFIG_PATH";

/// Mount point of the coefficient bundles in deployed environments.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/agentfico/config";

/// Default analysis window in days.
pub const DEFAULT_ANALYSIS_DAYS: u32 = 30;

/// Longest accepted analysis window.
pub const MAX_ANALYSIS_DAYS: u32 = 365;

/// Bring an analysis window into `1..=MAX_ANALYSIS_DAYS`.
pub fn clamp_analysis_days(days: u32) -> u32 {
    days.clamp(1, MAX_ANALYSIS_DAYS)
}

/// Scoring configuration.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub weights: WeightSet,
    pub analysis_days: u32,
    /// Directory holding `coefficients/*.json`.
    pub config_path: PathBuf,
    /// Checked when `config_path` does not exist (development checkouts).
    pub local_config_path: Option<PathBuf>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: WeightSet::default(),
            analysis_days: DEFAULT_ANALYSIS_DAYS,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            local_config_path: None,
        }
    }
}

impl ScoringConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to defaults; set-but-invalid values are
    /// errors, and so are weights that do not sum to 1.0.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = WeightSet::default();
        let weights = WeightSet::new(
            parse_var(KEY_WEIGHT_TX_SUCCESS)?.unwrap_or(defaults.tx_success()),
            parse_var(KEY_WEIGHT_X402)?.unwrap_or(defaults.x402_profitability()),
            parse_var(KEY_WEIGHT_ERC8004)?.unwrap_or(defaults.erc8004_stability()),
        )?;

        let config = Self {
            weights,
            analysis_days: check_analysis_days(
                parse_var(KEY_ANALYSIS_DAYS)?.unwrap_or(DEFAULT_ANALYSIS_DAYS),
            )?,
            config_path: env::var(KEY_CONFIG_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
            local_config_path: env::var(KEY_LOCAL_CONFIG_PATH).ok().map(PathBuf::from),
        };
        debug!(
            weights = ?config.weights,
            analysis_days = config.analysis_days,
            config_path = %config.config_path.display(),
            "Loaded scoring configuration"
        );
        Ok(config)
    }

    /// First existing coefficient directory, if any.
    pub fn resolve_config_dir(&self) -> Option<PathBuf> {
        std::iter::once(&self.config_path)
            .chain(self.local_config_path.as_ref())
            .find(|path| path.exists())
            .cloned()
    }
}

fn check_analysis_days(days: u32) -> Result<u32> {
    if (1..=MAX_ANALYSIS_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(Error::Config {
            message: format!(
                "{KEY_ANALYSIS_DAYS} must be between 1 and {MAX_ANALYSIS_DAYS}, got {days}"
            ),
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| Error::Config {
            message: format!("{key} has an invalid value: {raw}"),
        }),
        Err(_) => Ok(None),
    }
}
