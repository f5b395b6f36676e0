//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file. `DATABASE_URL` in the
//! environment (or a `.env` file loaded by the binary) overrides
//! `database.url`.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

mod database;
mod detection;
mod logging;

pub use database::{DatabaseConfig, DATABASE_URL_ENV};
pub use detection::DetectionConfig;
pub use logging::LoggingConfig;

/// Config file read when none is given explicitly.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load, apply environment overrides and validate.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config = Self::parse(&content)?;
        config.override_database_url(std::env::var(DATABASE_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else [`DEFAULT_CONFIG_PATH`] if it exists, else
    /// built-in defaults. An explicit path that cannot be read is an error.
    #[allow(clippy::result_large_err)]
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default = Path::new(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::load(default);
        }
        let mut config = Self::default();
        config.override_database_url(std::env::var(DATABASE_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML without environment overrides or validation.
    #[allow(clippy::result_large_err)]
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content).map_err(ConfigError::Parse)?)
    }

    /// Replace `database.url` with a non-empty override.
    pub fn override_database_url(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|url| !url.trim().is_empty()) {
            self.database.url = url;
        }
    }

    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        let detection = &self.detection;
        if detection.min_edge_threshold < Decimal::ZERO {
            return Err(invalid("detection.min_edge_threshold", "must not be negative"));
        }
        unit_interval("detection.kelly_multiplier", detection.kelly_multiplier)?;
        unit_interval("detection.kelly_cap_fraction", detection.kelly_cap_fraction)?;
        if let Some(tolerance) = detection.odds_move_tolerance {
            if tolerance <= Decimal::ZERO {
                return Err(invalid("detection.odds_move_tolerance", "must be greater than 0"));
            }
        }

        if self.database.url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database.url" }.into());
        }
        if self.database.snapshot_retention_hours <= 0 {
            return Err(invalid("database.snapshot_retention_hours", "must be at least 1"));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "logging.level" }.into());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(invalid("logging.format", "must be 'pretty' or 'json'"));
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}

#[allow(clippy::result_large_err)]
fn unit_interval(field: &'static str, value: Decimal) -> Result<()> {
    if value <= Decimal::ZERO || value > Decimal::ONE {
        return Err(invalid(field, "must be in (0, 1]"));
    }
    Ok(())
}
