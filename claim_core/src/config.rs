//! Configuration file support for vclaim.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/vclaim/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub evaluation: EvaluationConfig,

    #[serde(default)]
    pub aggregation: AggregationConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Evaluation period settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default = "default_days")]
    pub default_days: u32,

    #[serde(default = "default_allowed_periods")]
    pub allowed_periods: Vec<u32>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            default_days: default_days(),
            allowed_periods: default_allowed_periods(),
        }
    }
}

/// Thresholds the metric aggregators read from the logged severity scale.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AggregationConfig {
    /// Severity at or above which a log counts as a flare-up.
    #[serde(default = "default_flare_severity")]
    pub flare_severity: f64,

    /// Severity at or above which a day counts as severe.
    #[serde(default = "default_severe_severity")]
    pub severe_severity: f64,

    /// Severity at or above which an attack counts as prostrating when the
    /// log carries no explicit `prostrating` flag.
    #[serde(default = "default_prostrating_severity")]
    pub prostrating_severity: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            flare_severity: default_flare_severity(),
            severe_severity: default_severe_severity(),
            prostrating_severity: default_prostrating_severity(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|_| PathBuf::from("."))
    });
    base.join("vclaim")
}

fn default_days() -> u32 {
    90
}

fn default_allowed_periods() -> Vec<u32> {
    vec![30, 60, 90, 180, 365]
}

fn default_flare_severity() -> f64 {
    7.0
}

fn default_severe_severity() -> f64 {
    8.0
}

fn default_prostrating_severity() -> f64 {
    9.0
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from("."))
        });
        base.join("vclaim").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Check cross-field constraints serde defaults cannot express.
    pub fn validate(&self) -> Result<()> {
        let eval = &self.evaluation;
        if eval.allowed_periods.is_empty() {
            return Err(Error::Config("allowed_periods must not be empty".into()));
        }
        if !eval.allowed_periods.contains(&eval.default_days) {
            return Err(Error::Config(format!(
                "default_days {} is not one of the allowed periods {:?}",
                eval.default_days, eval.allowed_periods
            )));
        }
        let agg = &self.aggregation;
        for (name, value) in [
            ("flare_severity", agg.flare_severity),
            ("severe_severity", agg.severe_severity),
            ("prostrating_severity", agg.prostrating_severity),
        ] {
            if !(0.0..=crate::types::MAX_SEVERITY).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be within the 0-10 severity scale, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Resolve a requested evaluation period against the allowed list.
    pub fn evaluation_days(&self, requested: Option<u32>) -> Result<u32> {
        let days = requested.unwrap_or(self.evaluation.default_days);
        if self.evaluation.allowed_periods.contains(&days) {
            Ok(days)
        } else {
            Err(Error::Config(format!(
                "evaluation period {} days is not one of {:?}",
                days, self.evaluation.allowed_periods
            )))
        }
    }
}
