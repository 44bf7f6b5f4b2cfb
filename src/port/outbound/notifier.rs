//! Notifier port for ledger events.
//!
//! Notifications are best effort and delivered after the change they
//! describe has been committed. A failing notifier never rolls anything
//! back.

use crate::domain::{Amount, BidId, EscrowId, EventId, OfferId, OutcomeId, PayoutParty, TxHash};

/// Events that can trigger notifications.
#[derive(Debug, Clone)]
pub enum Notification {
    /// An offer's funding transaction was bound.
    OfferConfirmed {
        offer_id: OfferId,
        outcome_id: OutcomeId,
        coverage: Amount,
    },
    /// A batch of bids was confirmed.
    BidsConfirmed {
        bid_ids: Vec<BidId>,
        total: Amount,
    },
    /// A new outcome was seeded.
    OutcomeAdded {
        outcome_id: OutcomeId,
        event_id: EventId,
        name: String,
    },
    /// An outcome received its result.
    OutcomeResolved {
        outcome_id: OutcomeId,
        proposition: bool,
    },
    /// An escrow paid out.
    EscrowReleased {
        escrow_id: EscrowId,
        party: PayoutParty,
        amount: Amount,
        tx_hash: TxHash,
    },
}

/// Trait for notification handlers.
///
/// Implementations must be thread-safe and return quickly. Slow delivery
/// (HTTP, chat) should be handed off to a task.
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: Notification);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Notification) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting(Arc<AtomicUsize>);

    impl Notifier for Counting {
        fn notify(&self, _event: Notification) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn registry_broadcasts_to_every_notifier() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut registry = NotifierRegistry::new();
        assert!(registry.is_empty());
        registry.register(Box::new(Counting(hits.clone())));
        registry.register(Box::new(Counting(hits.clone())));

        registry.notify_all(Notification::OutcomeResolved {
            outcome_id: OutcomeId::new(1),
            proposition: true,
        });

        assert_eq!(registry.len(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
