//! A seeded ledger with every service wired to test doubles.

use std::sync::Arc;

use rust_decimal::Decimal;
use stakebook::application::resolution::VerifierRegistry;
use stakebook::application::settlement::SettlementService;
use stakebook::domain::{
    Amount, Bid, BidConfirmation, Offer, Outcome, OutcomeType, TxHash, UserId,
};
use stakebook::infrastructure::bootstrap::Ledger;
use stakebook::infrastructure::config::settings::Config;
use stakebook::port::outbound::ledger::LedgerStore;
use stakebook::testkit::domain::{event, odds, open_outcome, units};
use stakebook::testkit::notifier::RecordingNotifier;
use stakebook::testkit::payment::ScriptedPaymentGateway;
use stakebook::testkit::store::memory_ledger;

pub const WRITER: UserId = UserId::new(1);
pub const BIDDER: UserId = UserId::new(2);
pub const ESCROW_ADDRESS: &str = "escrow-custody";

pub struct World {
    pub ledger: Ledger,
    pub notifier: RecordingNotifier,
    pub gateway: ScriptedPaymentGateway,
    pub config: Config,
}

impl World {
    pub fn new() -> Self {
        Self::with_store(Arc::new(memory_ledger().expect("memory ledger")))
    }

    pub fn with_store(store: Arc<dyn LedgerStore>) -> Self {
        let notifier = RecordingNotifier::new();
        let ledger = Ledger::from_parts(store, VerifierRegistry::baseball(), notifier.registry());
        let mut config = Config::default();
        config.settlement.escrow_address = ESCROW_ADDRESS.to_string();
        Self {
            ledger,
            notifier,
            gateway: ScriptedPaymentGateway::new(),
            config,
        }
    }

    pub fn settlement(&self) -> SettlementService {
        self.ledger
            .settlement(&self.config, Arc::new(self.gateway.clone()))
            .expect("settlement terms")
    }

    /// An open outcome of `kind` on a fresh event.
    pub fn outcome(&self, kind: OutcomeType) -> Outcome {
        let seeding = self.ledger.seeding();
        let n = next_event_number();
        let event = seeding
            .seed_event(&event(n, chrono::Utc::now()))
            .expect("seed event");
        seeding
            .create_outcome(&open_outcome(event.id, kind))
            .expect("create outcome")
    }

    /// Offer by [`WRITER`], confirmed.
    pub fn confirmed_offer(&self, outcome: &Outcome, at: Decimal, coverage_units: i64) -> Offer {
        let offer = self
            .ledger
            .allocation()
            .create_offer(WRITER, outcome.id, odds(at), units(coverage_units))
            .expect("create offer");
        self.ledger
            .confirmation()
            .confirm_offer(&offer.hash, &TxHash::new(format!("otx-{}", offer.id.value())), WRITER)
            .expect("confirm offer")
    }

    /// Bid by [`BIDDER`], not yet confirmed.
    pub fn bid(&self, offer: &Offer, value: Amount) -> Bid {
        self.ledger
            .allocation()
            .create_bid(BIDDER, offer.id, value)
            .expect("create bid")
    }

    /// Bid by [`BIDDER`], confirmed.
    pub fn confirmed_bid(&self, offer: &Offer, value_units: i64) -> Bid {
        let bid = self.bid(offer, units(value_units));
        self.ledger
            .confirmation()
            .confirm_bids(&[confirmation(&bid)], BIDDER)
            .expect("confirm bid")
            .remove(0)
    }
}

pub fn confirmation(bid: &Bid) -> BidConfirmation {
    BidConfirmation {
        bid_hash: bid.hash.clone(),
        tx_hash: TxHash::new(format!("btx-{}", bid.hash)),
    }
}

fn next_event_number() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};
    static NEXT: AtomicU32 = AtomicU32::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}
