//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file with environment variable overrides
//! for sensitive values like `STAKEBOOK_ESCROW_PASSWORD`.
//!
//! # Example
//!
//! ```no_run
//! use stakebook::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use url::Url;

use super::logging::LoggingConfig;
use super::retention::RetentionConfig;
use super::settlement::SettlementConfig;
use super::wallet::WalletConfig;
use crate::adapter::outbound::wallet::ESCROW_PASSWORD_ENV;
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Every section is optional. Load from a TOML file using [`Config::load`]
/// or parse directly with [`Config::parse_toml`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Path to SQLite database file.
    ///
    /// Defaults to "stakebook.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Commission rate and escrow custody address.
    #[serde(default)]
    pub settlement: SettlementConfig,

    /// Merchant wallet service used for funding and payouts.
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Provisional record retention.
    #[serde(default)]
    pub retention: RetentionConfig,
}

fn default_database_path() -> String {
    "stakebook.db".to_string()
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Loads the wallet password from the `STAKEBOOK_ESCROW_PASSWORD`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - Validation fails (e.g., a commission rate of 1 or more)
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        // Never from the config file.
        config.wallet.password = std::env::var(ESCROW_PASSWORD_ENV)
            .ok()
            .filter(|p| !p.is_empty());

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// Wallet fields may be left empty; they are only required by commands
    /// that move funds.
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        self.settlement.terms()?;
        if self.retention.provisional_hours == 0 {
            return Err(ConfigError::InvalidValue {
                field: "provisional_hours",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if !self.wallet.base_url.is_empty() {
            Url::parse(&self.wallet.base_url).map_err(|e| ConfigError::InvalidValue {
                field: "base_url",
                reason: e.to_string(),
            })?;
        }
        if self.wallet.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.database, "stakebook.db");
        assert_eq!(config.settlement.commission_rate, dec!(0.05));
        assert_eq!(config.retention.provisional_hours, 1);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.wallet.timeout_secs, 30);
    }

    #[test]
    fn sections_are_read() {
        let config = Config::parse_toml(
            r#"
            database = "ledger.db"

            [logging]
            level = "debug"
            format = "json"

            [settlement]
            commission_rate = "0.1"
            escrow_address = "escrow-addr"

            [wallet]
            base_url = "https://wallet.example/api"
            escrow_guid = "guid-1"
            timeout_secs = 5

            [retention]
            provisional_hours = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.database, "ledger.db");
        assert_eq!(config.logging.format, super::super::logging::LogFormat::Json);
        assert_eq!(config.settlement.commission_rate, dec!(0.1));
        assert_eq!(config.settlement.escrow_address, "escrow-addr");
        assert_eq!(config.wallet.escrow_guid, "guid-1");
        assert_eq!(config.retention.provisional_window(), chrono::Duration::hours(6));
    }

    #[test]
    fn commission_rate_must_be_below_one() {
        let err = Config::parse_toml("[settlement]\ncommission_rate = \"1\"\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "commission_rate",
                ..
            })
        ));
    }

    #[test]
    fn zero_retention_is_rejected() {
        assert!(Config::parse_toml("[retention]\nprovisional_hours = 0\n").is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            Config::parse_toml("database = ").unwrap_err(),
            Error::Config(ConfigError::Parse(_))
        ));
    }
}
