//! Taking positions: offers supply coverage, bids consume it.

use std::sync::Arc;

use tracing::info;

use crate::domain::{Amount, Bid, NewBid, NewOffer, Odds, Offer, OfferId, OutcomeId, RecordHash, UserId};
use crate::error::Result;
use crate::port::outbound::ledger::{AggregateRequest, AllocatedBid, LedgerStore, PositionStore};

use super::rejected;

/// Creates provisional offers and bids.
///
/// Nothing created here holds stake until it is confirmed through
/// [`ConfirmationService`](super::confirmation::ConfirmationService).
pub struct AllocationEngine {
    store: Arc<dyn LedgerStore>,
}

impl AllocationEngine {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Post provisional collateral against an open outcome.
    ///
    /// # Errors
    /// `Validation` for non-positive coverage, `NotFound` or
    /// `OutcomeClosed` for the outcome.
    pub fn create_offer(&self, caller: UserId, outcome_id: OutcomeId, odds: Odds, coverage: Amount) -> Result<Offer> {
        let offer = self
            .store
            .insert_offer(&NewOffer {
                user_id: caller,
                outcome_id,
                odds,
                coverage,
                hash: RecordHash::generate(),
            })
            .map_err(rejected("create_offer"))?;
        info!(
            offer_id = %offer.id,
            %outcome_id,
            odds = %odds.as_decimal(),
            %coverage,
            "Offer created"
        );
        Ok(offer)
    }

    /// Bid directly against one offer.
    ///
    /// # Errors
    /// `OfferNotConfirmed`, `OutcomeClosed`, or `InsufficientCoverage` when
    /// the value exceeds the offer's remaining coverage.
    pub fn create_bid(&self, caller: UserId, offer_id: OfferId, value: Amount) -> Result<Bid> {
        let bid = self
            .store
            .place_bid(&NewBid {
                user_id: caller,
                offer_id,
                value,
                hash: RecordHash::generate(),
            })
            .map_err(rejected("create_bid"))?;
        info!(bid_id = %bid.id, %offer_id, %value, "Bid created");
        Ok(bid)
    }

    /// Cover `amount` at `odds` across every matching offer, oldest first.
    ///
    /// Returns one provisional bid per offer touched. On shortfall nothing
    /// is created.
    ///
    /// # Errors
    /// `InsufficientCoverage` when the matching offers cannot cover the
    /// amount, `OutcomeClosed`, or `Validation` for a non-positive amount.
    pub fn aggregate_bid(
        &self,
        caller: UserId,
        outcome_id: OutcomeId,
        odds: Odds,
        amount: Amount,
    ) -> Result<Vec<AllocatedBid>> {
        let allocated = self
            .store
            .allocate(&AggregateRequest {
                user_id: caller,
                outcome_id,
                odds,
                amount,
            })
            .map_err(rejected("aggregate_bid"))?;
        info!(
            %outcome_id,
            %amount,
            offers = allocated.len(),
            "Aggregate bid allocated"
        );
        Ok(allocated)
    }
}
