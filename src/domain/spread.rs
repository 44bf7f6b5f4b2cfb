//! Read models returned by the query operations.

use serde::Serialize;

use super::bid::Bid;
use super::offer::Offer;
use super::outcome::{Event, Outcome};

/// A confirmed offer together with its confirmed bids.
#[derive(Debug, Clone, Serialize)]
pub struct OfferBook {
    pub offer: Offer,
    pub bids: Vec<Bid>,
}

/// One outcome with its event and its confirmed offers and bids.
///
/// Provisional records hold no stake and are omitted.
#[derive(Debug, Clone, Serialize)]
pub struct Spread {
    pub event: Event,
    pub outcome: Outcome,
    pub offers: Vec<OfferBook>,
}

impl Spread {
    /// Number of confirmed bids across all offers.
    #[must_use]
    pub fn bid_count(&self) -> usize {
        self.offers.iter().map(|book| book.bids.len()).sum()
    }
}

/// A user's confirmed positions on outcomes that are still open.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivePositions {
    pub offers: Vec<Offer>,
    pub bids: Vec<Bid>,
}
