//! Bids: counter-stakes against one offer's remaining coverage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{BidId, OfferId, RecordHash, TxHash, UserId};
use super::money::Amount;

/// A claim against a specific offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub offer_id: OfferId,
    pub user_id: UserId,
    pub value: Amount,
    pub hash: RecordHash,
    pub tx_hash: Option<TxHash>,
    /// Mirrors the proposition: the opposite of the offer's result.
    pub result: Option<bool>,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

impl Bid {
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        self.tx_hash.is_some()
    }
}

/// Fields needed to record a provisional bid.
#[derive(Debug, Clone)]
pub struct NewBid {
    pub user_id: UserId,
    pub offer_id: OfferId,
    pub value: Amount,
    pub hash: RecordHash,
}

/// One entry of a batch confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidConfirmation {
    pub bid_hash: RecordHash,
    pub tx_hash: TxHash,
}
