mod support;

use rust_decimal_macros::dec;
use stakebook::domain::{Amount, Bid, Escrow, OutcomeId, OutcomeType, PayoutParty, TxHash, UserId};
use stakebook::error::{ErrorKind, LedgerError};
use stakebook::port::outbound::ledger::{EscrowStore, PositionStore};
use stakebook::port::outbound::notifier::Notification;
use stakebook::testkit::domain::{game_data, units};
use stakebook::testkit::payment::{Reply, SentPayment};
use support::world::{World, BIDDER, ESCROW_ADDRESS, WRITER};

const BIDDER_ADDRESS: &str = "addr-bidder";
const WRITER_ADDRESS: &str = "addr-writer";

/// A confirmed 100-unit bid at odds 2.5 on a "no runs home" outcome,
/// funded into escrow.
async fn funded(world: &World) -> (Bid, Escrow, OutcomeId) {
    let settlement = world.settlement();
    let bidder_wallet = settlement.register_wallet(BIDDER, BIDDER_ADDRESS).unwrap();
    settlement.register_wallet(WRITER, WRITER_ADDRESS).unwrap();

    let outcome = world.outcome(OutcomeType::NoRunsHome);
    let offer = world.confirmed_offer(&outcome, dec!(2.5), 1_000);
    let bid = world.confirmed_bid(&offer, 100);
    let escrow = settlement.fund(bid.id, bidder_wallet.id, BIDDER).await.unwrap();
    (bid, escrow, outcome.id)
}

#[tokio::test]
async fn funding_splits_commission_and_is_idempotent() {
    let world = World::new();
    let (bid, escrow, _) = funded(&world).await;

    assert!(escrow.active);
    assert_eq!(escrow.commission, units(5));
    assert_eq!(escrow.value, units(95));
    assert_eq!(escrow.gross(), bid.value);
    assert_eq!(
        world.gateway.sent(),
        vec![SentPayment {
            destination: ESCROW_ADDRESS.to_string(),
            amount: units(100),
        }]
    );

    let again = world
        .settlement()
        .fund(bid.id, escrow.wallet_id, BIDDER)
        .await
        .unwrap();
    assert_eq!(again.id, escrow.id);
    assert_eq!(world.gateway.sent().len(), 1);
}

#[tokio::test]
async fn winning_bid_is_paid_odds_less_commission() {
    let world = World::new();
    let (bid, escrow, outcome_id) = funded(&world).await;
    world
        .ledger
        .resolution()
        .resolve(outcome_id, &game_data(0, 1))
        .unwrap();

    let released = world.settlement().release(escrow.id).await.unwrap();

    let payout = Amount::try_from_major(dec!(237.5)).unwrap();
    assert_eq!(
        world.gateway.sent().last(),
        Some(&SentPayment {
            destination: BIDDER_ADDRESS.to_string(),
            amount: payout,
        })
    );
    assert!(!released.active);
    assert_eq!(released.payout_hash, Some(TxHash::new("tx-2")));
    assert!(released.payout_date.is_some());
    assert!(world.ledger.store().bid(bid.id).unwrap().unwrap().is_paid);

    assert!(world.notifier.events().iter().any(|event| matches!(
        event,
        Notification::EscrowReleased { party: PayoutParty::Bidder, amount, .. } if *amount == payout
    )));
}

#[tokio::test]
async fn losing_bid_pays_the_offer_writer() {
    let world = World::new();
    let (_, escrow, outcome_id) = funded(&world).await;
    world
        .ledger
        .resolution()
        .resolve(outcome_id, &game_data(3, 1))
        .unwrap();

    let quote = world.settlement().quote(escrow.id).unwrap();
    assert_eq!(quote.payout.party, PayoutParty::OfferWriter);
    assert_eq!(quote.payout.recipient, WRITER);
    assert_eq!(quote.destination.address, WRITER_ADDRESS);

    world.settlement().release(escrow.id).await.unwrap();
    assert_eq!(
        world.gateway.sent().last(),
        Some(&SentPayment {
            destination: WRITER_ADDRESS.to_string(),
            amount: units(95),
        })
    );
}

#[tokio::test]
async fn unresolved_bids_are_not_released() {
    let world = World::new();
    let (bid, escrow, _) = funded(&world).await;

    let err = world.settlement().release(escrow.id).await.unwrap_err();
    assert_eq!(
        err.as_ledger(),
        Some(&LedgerError::BidUnresolved {
            bid_id: bid.id.value()
        })
    );
    assert_eq!(world.gateway.sent().len(), 1);
}

#[tokio::test]
async fn failed_payout_leaves_escrow_retryable() {
    let world = World::new();
    let (_, escrow, outcome_id) = funded(&world).await;
    world
        .ledger
        .resolution()
        .resolve(outcome_id, &game_data(0, 0))
        .unwrap();
    world
        .gateway
        .push(Reply::NoHash("insufficient funds".into()))
        .push(Reply::Unreachable("connection reset".into()));
    let settlement = world.settlement();

    for _ in 0..2 {
        let err = settlement.release(escrow.id).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::External));
        assert!(err.is_retryable());
    }
    let held = world.ledger.store().escrow(escrow.id).unwrap().unwrap();
    assert!(held.active);
    assert_eq!(world.gateway.sent().len(), 3);

    let released = settlement.release(escrow.id).await.unwrap();
    assert!(!released.active);

    let err = settlement.release(escrow.id).await.unwrap_err();
    assert_eq!(
        err.as_ledger(),
        Some(&LedgerError::EscrowInactive {
            escrow_id: escrow.id.value()
        })
    );
}

#[tokio::test]
async fn reconciled_payouts_are_idempotent_per_hash() {
    let world = World::new();
    let (bid, escrow, _) = funded(&world).await;
    let settlement = world.settlement();
    let observed = TxHash::new("external-1");

    let paid = settlement.reconcile_payout(escrow.id, &observed).unwrap();
    assert!(!paid.active);
    assert_eq!(paid.payout_hash.as_ref(), Some(&observed));
    assert!(world.ledger.store().bid(bid.id).unwrap().unwrap().is_paid);

    let again = settlement.reconcile_payout(escrow.id, &observed).unwrap();
    assert_eq!(again, paid);

    let err = settlement
        .reconcile_payout(escrow.id, &TxHash::new("external-2"))
        .unwrap_err();
    assert_eq!(
        err.as_ledger(),
        Some(&LedgerError::PayoutConflict {
            escrow_id: escrow.id.value()
        })
    );
}

#[tokio::test]
async fn only_the_bidder_funds_a_confirmed_bid() {
    let world = World::new();
    let settlement = world.settlement();
    let wallet = settlement.register_wallet(BIDDER, BIDDER_ADDRESS).unwrap();
    let outcome = world.outcome(OutcomeType::NoRunsHome);
    let offer = world.confirmed_offer(&outcome, dec!(2), 100);
    let provisional = world.bid(&offer, units(10));

    let err = settlement
        .fund(provisional.id, wallet.id, BIDDER)
        .await
        .unwrap_err();
    assert_eq!(
        err.as_ledger(),
        Some(&LedgerError::BidNotConfirmed {
            bid_id: provisional.id.value()
        })
    );

    let confirmed = world.confirmed_bid(&offer, 5);
    let err = settlement
        .fund(confirmed.id, wallet.id, UserId::new(77))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Authorization));

    let foreign = settlement.register_wallet(WRITER, WRITER_ADDRESS).unwrap();
    let err = settlement
        .fund(confirmed.id, foreign.id, BIDDER)
        .await
        .unwrap_err();
    assert_eq!(err.as_ledger(), Some(&LedgerError::NotOwner { entity: "wallet" }));
    assert!(world.gateway.sent().is_empty());
}

#[tokio::test]
async fn concurrent_releases_send_one_payout() {
    let world = World::new();
    let (_, escrow, outcome_id) = funded(&world).await;
    world
        .ledger
        .resolution()
        .resolve(outcome_id, &game_data(0, 1))
        .unwrap();
    world.gateway.yield_before_send();
    let settlement = world.settlement();

    let (first, second) = tokio::join!(settlement.release(escrow.id), settlement.release(escrow.id));

    let released = first.unwrap();
    assert!(!released.active);
    assert_eq!(
        second.unwrap_err().as_ledger(),
        Some(&LedgerError::TransferInFlight {
            entity: "escrow",
            id: escrow.id.value()
        })
    );
    assert_eq!(world.gateway.sent().len(), 2);
    let releases = world
        .notifier
        .events()
        .iter()
        .filter(|event| matches!(event, Notification::EscrowReleased { .. }))
        .count();
    assert_eq!(releases, 1);
}

#[tokio::test]
async fn concurrent_funding_sends_once() {
    let world = World::new();
    let settlement = world.settlement();
    let wallet = settlement.register_wallet(BIDDER, BIDDER_ADDRESS).unwrap();
    let outcome = world.outcome(OutcomeType::NoRunsHome);
    let offer = world.confirmed_offer(&outcome, dec!(2), 100);
    let bid = world.confirmed_bid(&offer, 10);
    world.gateway.yield_before_send();

    let (first, second) = tokio::join!(
        settlement.fund(bid.id, wallet.id, BIDDER),
        settlement.fund(bid.id, wallet.id, BIDDER)
    );

    let escrow = first.unwrap();
    assert_eq!(
        second.unwrap_err().as_ledger(),
        Some(&LedgerError::TransferInFlight {
            entity: "bid",
            id: bid.id.value()
        })
    );
    assert_eq!(world.gateway.sent().len(), 1);
    assert_eq!(world.ledger.store().escrows_for_bid(bid.id).unwrap(), vec![escrow.clone()]);

    let again = settlement.fund(bid.id, wallet.id, BIDDER).await.unwrap();
    assert_eq!(again, escrow);
    assert_eq!(world.gateway.sent().len(), 1);
}

#[tokio::test]
async fn failed_funding_can_be_retried() {
    let world = World::new();
    let settlement = world.settlement();
    let wallet = settlement.register_wallet(BIDDER, BIDDER_ADDRESS).unwrap();
    let outcome = world.outcome(OutcomeType::NoRunsHome);
    let offer = world.confirmed_offer(&outcome, dec!(2), 100);
    let bid = world.confirmed_bid(&offer, 10);
    world.gateway.push(Reply::Unreachable("connection reset".into()));

    let err = settlement.fund(bid.id, wallet.id, BIDDER).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(world.ledger.store().escrows_for_bid(bid.id).unwrap().is_empty());

    let escrow = settlement.fund(bid.id, wallet.id, BIDDER).await.unwrap();
    assert_eq!(escrow.gross(), units(10));
    assert_eq!(world.gateway.sent().len(), 2);
}

#[tokio::test]
async fn reconciled_funding_clears_an_abandoned_claim() {
    let world = World::new();
    let settlement = world.settlement();
    let wallet = settlement.register_wallet(BIDDER, BIDDER_ADDRESS).unwrap();
    let outcome = world.outcome(OutcomeType::NoRunsHome);
    let offer = world.confirmed_offer(&outcome, dec!(2), 100);
    let bid = world.confirmed_bid(&offer, 10);
    world.ledger.store().claim_funding(bid.id, "crashed").unwrap();

    let err = settlement.fund(bid.id, wallet.id, BIDDER).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Conflict));

    let observed = TxHash::new("external-in");
    let escrow = settlement
        .reconcile_funding(bid.id, wallet.id, BIDDER, &observed)
        .unwrap();
    assert_eq!(escrow.incoming_hash, observed);

    let err = settlement
        .reconcile_funding(bid.id, wallet.id, BIDDER, &TxHash::new("external-other"))
        .unwrap_err();
    assert_eq!(
        err.as_ledger(),
        Some(&LedgerError::AlreadyFunded {
            bid_id: bid.id.value()
        })
    );

    assert_eq!(settlement.fund(bid.id, wallet.id, BIDDER).await.unwrap(), escrow);
    assert!(world.gateway.sent().is_empty());
}
