//! Registered payout wallets.

use serde::{Deserialize, Serialize};

use super::id::{UserId, WalletId};

/// A user's payout destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub user_id: UserId,
    pub address: String,
}
