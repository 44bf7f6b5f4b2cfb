//! Commission and custody settings for escrow settlement.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::settlement::SettlementTerms;
use crate::domain::CommissionRate;
use crate::error::{ConfigError, Result};

/// Settlement configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// House share of each bid, in `[0, 1)`.
    pub commission_rate: Decimal,
    /// Custody address escrow funding is sent to.
    pub escrow_address: String,
}

impl SettlementConfig {
    /// Validated terms for the settlement service.
    ///
    /// # Errors
    /// `InvalidValue` when the commission rate is out of range.
    pub fn terms(&self) -> Result<SettlementTerms> {
        let rate = CommissionRate::try_new(self.commission_rate).map_err(|e| ConfigError::InvalidValue {
            field: "commission_rate",
            reason: e.to_string(),
        })?;
        Ok(SettlementTerms {
            rate,
            escrow_address: self.escrow_address.clone(),
        })
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            commission_rate: CommissionRate::default().as_decimal(),
            escrow_address: String::new(),
        }
    }
}
