//! Wallet service port.

use async_trait::async_trait;

use crate::domain::id::TxHash;
use crate::domain::money::Amount;
use crate::error::Result;

/// Reply from the wallet service for one transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payment {
    /// Hash of the broadcast transaction. `None` means nothing was sent.
    pub tx_hash: Option<TxHash>,
    /// Free-form status message from the service.
    pub message: Option<String>,
}

/// Moves funds between the escrow wallet and user addresses.
///
/// Implementations must not be called while a ledger transaction is open.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Send `amount` to `destination`.
    async fn send(&self, destination: &str, amount: Amount) -> Result<Payment>;

    /// Gateway name for logs.
    fn name(&self) -> &'static str;
}
