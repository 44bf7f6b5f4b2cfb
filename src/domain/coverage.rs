//! Journal of coverage consumed from offers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{BidId, OfferId};
use super::money::Amount;

/// One successful coverage decrement and the bid that caused it.
///
/// Entries are written in the same transaction as the decrement, so for
/// every offer `coverage - Σ entries == remaining_coverage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageEntry {
    pub offer_id: OfferId,
    pub bid_id: BidId,
    pub amount: Amount,
    pub recorded_at: DateTime<Utc>,
}
