//! Ledger configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use treasury_observability::ObservabilityConfig;

/// Largest `amount_scale` accepted.
pub const MAX_AMOUNT_SCALE: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Treasury ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreasuryConfig {
    /// Decimal places billed amounts are rounded to (half-even).
    pub amount_scale: u32,

    /// Logging
    pub observability: ObservabilityConfig,
}

impl Default for TreasuryConfig {
    fn default() -> Self {
        Self {
            amount_scale: 2,
            observability: ObservabilityConfig::default(),
        }
    }
}

impl TreasuryConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: TreasuryConfig = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = TreasuryConfig::default();

        if let Some(scale) = var("TREASURY_AMOUNT_SCALE") {
            config.amount_scale = scale
                .parse()
                .map_err(|_| ConfigError::Parse(format!("TREASURY_AMOUNT_SCALE: {scale:?} is not an integer")))?;
        }

        if let Some(filter) = var("TREASURY_LOG_FILTER") {
            config.observability.log_filter = filter;
        }

        if let Some(json) = var("TREASURY_LOG_JSON") {
            config.observability.json = json
                .parse()
                .map_err(|_| ConfigError::Parse(format!("TREASURY_LOG_JSON: {json:?} is not a boolean")))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.amount_scale > MAX_AMOUNT_SCALE {
            return Err(ConfigError::Invalid(format!(
                "amount_scale must be at most {MAX_AMOUNT_SCALE}, got {}",
                self.amount_scale
            )));
        }
        Ok(())
    }
}
