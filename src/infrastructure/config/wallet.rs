//! Wallet service connection settings.

use std::time::Duration;

use serde::Deserialize;

/// Merchant wallet configuration.
///
/// The password is loaded from `STAKEBOOK_ESCROW_PASSWORD` at runtime (never
/// from the config file).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub base_url: String,
    pub escrow_guid: String,
    pub timeout_secs: u64,
    #[serde(skip)]
    pub password: Option<String>,
}

impl WalletConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            escrow_guid: String::new(),
            timeout_secs: 30,
            password: None,
        }
    }
}
