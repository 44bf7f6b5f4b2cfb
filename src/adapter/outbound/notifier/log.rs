//! Notifier that writes ledger events to `tracing`.

use tracing::info;

use crate::port::outbound::notifier::{Notification, Notifier};

/// A logging notifier that logs events via tracing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Notification) {
        match event {
            Notification::OfferConfirmed {
                offer_id,
                outcome_id,
                coverage,
            } => {
                info!(%offer_id, %outcome_id, %coverage, "Offer confirmed");
            }
            Notification::BidsConfirmed { bid_ids, total } => {
                info!(count = bid_ids.len(), %total, "Bids confirmed");
            }
            Notification::OutcomeAdded {
                outcome_id,
                event_id,
                name,
            } => {
                info!(%outcome_id, %event_id, name = %name, "Outcome added");
            }
            Notification::OutcomeResolved {
                outcome_id,
                proposition,
            } => {
                info!(%outcome_id, proposition, "Outcome resolved");
            }
            Notification::EscrowReleased {
                escrow_id,
                party,
                amount,
                tx_hash,
            } => {
                info!(
                    %escrow_id,
                    party = ?party,
                    %amount,
                    tx_hash = %tx_hash.as_str(),
                    "Escrow released"
                );
            }
        }
    }
}
