//! Coverage ledger: per-offer remaining coverage under concurrent writers.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::error::DomainError;
use crate::domain::{Amount, BidId, CoverageEntry, Offer, OfferId};
use crate::error::{LedgerError, Result};
use crate::port::outbound::ledger::{LedgerStore, OutcomeStore, PositionStore};

use super::rejected;

/// Balance check of an offer against its journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoverageAudit {
    pub offer_id: OfferId,
    pub coverage: Amount,
    pub remaining: Amount,
    /// Sum of every journaled decrement.
    pub journaled: Amount,
}

impl CoverageAudit {
    /// Whether `coverage - journaled == remaining`.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.coverage.checked_sub(self.journaled) == Some(self.remaining)
    }
}

/// Owns the monotonic decrement of `remaining_coverage`.
pub struct CoverageLedger {
    store: Arc<dyn LedgerStore>,
}

impl CoverageLedger {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Consume `amount` of an offer's coverage for `bid_id`.
    ///
    /// Two decrements whose sum exceeds the remaining coverage never both
    /// succeed.
    ///
    /// `bid_id` must be a confirmed bid on `offer_id` and `amount` its value.
    ///
    /// # Errors
    /// `Validation` for a non-positive amount or a bid that does not match,
    /// `NotFound`, `BidNotConfirmed`, `AlreadyConfirmed` once journaled,
    /// `OfferNotConfirmed`, `OutcomeClosed`, or `InsufficientCoverage`.
    pub fn decrement(&self, offer_id: OfferId, bid_id: BidId, amount: Amount) -> Result<Offer> {
        self.store
            .decrement_coverage(offer_id, bid_id, amount)
            .map_err(rejected("decrement_coverage"))
    }

    /// Reserve `amount` of unconsumed, unheld coverage.
    ///
    /// # Errors
    /// Same classification as [`decrement`](Self::decrement).
    pub fn hold(&self, offer_id: OfferId, amount: Amount) -> Result<Offer> {
        self.store
            .hold_coverage(offer_id, amount)
            .map_err(rejected("hold_coverage"))
    }

    /// Current remaining coverage.
    ///
    /// # Errors
    /// `NotFound` for an unknown offer.
    pub fn remaining(&self, offer_id: OfferId) -> Result<Amount> {
        Ok(self.load(offer_id)?.remaining_coverage)
    }

    /// Largest stake the offer can still cover at its odds. Zero once the
    /// outcome has closed.
    ///
    /// # Errors
    /// `NotFound` for an unknown offer or outcome.
    pub fn max_bid(&self, offer_id: OfferId) -> Result<Amount> {
        let offer = self.load(offer_id)?;
        let outcome = self
            .store
            .outcome(offer.outcome_id)?
            .ok_or_else(|| LedgerError::not_found("outcome", offer.outcome_id))?;
        if !outcome.is_open {
            return Ok(Amount::ZERO);
        }
        Ok(offer.max_bid())
    }

    /// Decrements applied to an offer, oldest first.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn journal(&self, offer_id: OfferId) -> Result<Vec<CoverageEntry>> {
        self.store.coverage_entries(offer_id)
    }

    /// Compare an offer's remaining coverage with its journal.
    ///
    /// # Errors
    /// `NotFound` for an unknown offer, or `Overflow` if the journal total
    /// does not fit.
    pub fn audit(&self, offer_id: OfferId) -> Result<CoverageAudit> {
        let offer = self.load(offer_id)?;
        let entries = self.journal(offer_id)?;
        let journaled =
            Amount::checked_sum(entries.iter().map(|e| e.amount)).ok_or(DomainError::Overflow)?;
        Ok(CoverageAudit {
            offer_id,
            coverage: offer.coverage,
            remaining: offer.remaining_coverage,
            journaled,
        })
    }

    fn load(&self, offer_id: OfferId) -> Result<Offer> {
        self.store
            .offer(offer_id)?
            .ok_or_else(|| LedgerError::not_found("offer", offer_id).into())
    }
}
