//! Two-phase confirmation: provisional records become real once the
//! funding transaction is observed.

use std::sync::Arc;

use tracing::info;

use crate::domain::{Amount, Bid, BidConfirmation, Offer, RecordHash, TxHash, UserId};
use crate::error::Result;
use crate::port::outbound::ledger::{LedgerStore, PositionStore};
use crate::port::outbound::notifier::{Notification, NotifierRegistry};

use super::rejected;

/// Binds transaction hashes to provisional offers and bids.
pub struct ConfirmationService {
    store: Arc<dyn LedgerStore>,
    notifiers: Arc<NotifierRegistry>,
}

impl ConfirmationService {
    pub fn new(store: Arc<dyn LedgerStore>, notifiers: Arc<NotifierRegistry>) -> Self {
        Self { store, notifiers }
    }

    /// Confirm an offer.
    ///
    /// # Errors
    /// `NotFound`, `AlreadyConfirmed`, `NotOwner` (checked in that order),
    /// then `OutcomeClosed`.
    pub fn confirm_offer(&self, hash: &RecordHash, tx_hash: &TxHash, caller: UserId) -> Result<Offer> {
        let offer = self
            .store
            .confirm_offer(hash, tx_hash, caller)
            .map_err(rejected("confirm_offer"))?;
        info!(
            offer_id = %offer.id,
            tx_hash = %tx_hash,
            coverage = %offer.coverage,
            "Offer confirmed"
        );
        self.notifiers.notify_all(Notification::OfferConfirmed {
            offer_id: offer.id,
            outcome_id: offer.outcome_id,
            coverage: offer.coverage,
        });
        Ok(offer)
    }

    /// Confirm a batch of bids, consuming their offers' coverage.
    ///
    /// The batch is all-or-nothing.
    ///
    /// # Errors
    /// The first failing item's error: the confirmation checks, then
    /// `OutcomeClosed` or `InsufficientCoverage`.
    pub fn confirm_bids(&self, items: &[BidConfirmation], caller: UserId) -> Result<Vec<Bid>> {
        let bids = self
            .store
            .confirm_bids(items, caller)
            .map_err(rejected("confirm_bids"))?;
        let total = bids
            .iter()
            .fold(Amount::ZERO, |sum, b| sum.saturating_add(b.value));
        info!(count = bids.len(), %total, "Bids confirmed");
        self.notifiers.notify_all(Notification::BidsConfirmed {
            bid_ids: bids.iter().map(|b| b.id).collect(),
            total,
        });
        Ok(bids)
    }
}
