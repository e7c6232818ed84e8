//! User settings for dealtrack
//!
//! Brokerage-level preferences: display formats, the default commission rate,
//! the trailing window for closing statistics and the risk weights.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::paths::DealPaths;
use crate::error::DealError;
use crate::reports::RiskPolicy;

/// User settings for dealtrack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used in terminal output
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Commission rate applied when a transaction is created without one
    #[serde(default = "default_commission_rate")]
    pub default_commission_rate: f64,

    /// Trailing window (days) for average days-to-close
    #[serde(default = "default_metrics_window_days")]
    pub metrics_window_days: u32,

    /// Risk scoring weights
    #[serde(default)]
    pub risk_policy: RiskPolicy,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_commission_rate() -> f64 {
    0.06
}

fn default_metrics_window_days() -> u32 {
    90
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            default_commission_rate: default_commission_rate(),
            metrics_window_days: default_metrics_window_days(),
            risk_policy: RiskPolicy::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &DealPaths) -> Result<Self, DealError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            debug!(path = %settings_path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| DealError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| DealError::Config(format!("Failed to parse settings file: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &DealPaths) -> Result<(), DealError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| DealError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| DealError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), DealError> {
        if !(0.0..=1.0).contains(&self.default_commission_rate) {
            return Err(DealError::Config(format!(
                "default_commission_rate must be between 0 and 1, got {}",
                self.default_commission_rate
            )));
        }
        if self.risk_policy.low_max >= self.risk_policy.medium_max {
            return Err(DealError::Config(
                "risk_policy.low_max must be below risk_policy.medium_max".into(),
            ));
        }
        Ok(())
    }
}
