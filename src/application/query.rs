//! Read-side queries.

use std::sync::Arc;

use crate::domain::{ActivePositions, Outcome, OutcomeFilter, OutcomeId, RecordHash, Spread, Standing, UserId};
use crate::error::{LedgerError, Result};
use crate::port::outbound::ledger::{LedgerStore, OutcomeStore, PositionStore};

/// Read-only views over the ledger.
pub struct LedgerQuery {
    store: Arc<dyn LedgerStore>,
}

impl LedgerQuery {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Event, outcome, confirmed offers and their confirmed bids.
    ///
    /// # Errors
    /// `NotFound` for an unknown outcome.
    pub fn spread(&self, outcome_id: OutcomeId) -> Result<Spread> {
        self.store
            .spread(outcome_id)?
            .ok_or_else(|| LedgerError::not_found("outcome", outcome_id).into())
    }

    pub fn outcomes(&self, filter: &OutcomeFilter) -> Result<Vec<Outcome>> {
        self.store.list_outcomes(filter)
    }

    pub fn active_positions(&self, user: UserId) -> Result<ActivePositions> {
        self.store.active_positions(user)
    }

    /// Win status of an offer, looked up by its issued hash.
    pub fn offer_status(&self, hash: &RecordHash) -> Result<Standing> {
        self.store
            .offer_by_hash(hash)?
            .map(|offer| offer.standing())
            .ok_or_else(|| LedgerError::not_found("offer", hash).into())
    }

    /// Win status of a bid, looked up by its issued hash.
    pub fn bid_status(&self, hash: &RecordHash) -> Result<Standing> {
        self.store
            .bid_by_hash(hash)?
            .map(|bid| Standing::from_result(bid.result))
            .ok_or_else(|| LedgerError::not_found("bid", hash).into())
    }
}
