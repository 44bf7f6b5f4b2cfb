mod harness;
mod support;

use std::thread;

use rust_decimal_macros::dec;
use stakebook::domain::{Amount, OutcomeType};
use stakebook::error::LedgerError;
use stakebook::port::outbound::ledger::PositionStore;
use stakebook::testkit::domain::{odds, units};
use harness::temp_db::TempDb;
use support::world::{confirmation, World, BIDDER};

#[test]
fn overlapping_confirmations_never_overdraw_coverage() {
    let db = TempDb::create("overlap");
    let world = World::with_store(db.ledger());
    let outcome = world.outcome(OutcomeType::NoRunsHome);
    let offer = world.confirmed_offer(&outcome, dec!(2), 5);
    let first = world.bid(&offer, units(4));
    let second = world.bid(&offer, units(4));

    let results: Vec<_> = thread::scope(|scope| {
        [&first, &second]
            .map(|bid| {
                let ledger = &world.ledger;
                scope.spawn(move || {
                    ledger
                        .confirmation()
                        .confirm_bids(&[confirmation(bid)], BIDDER)
                })
            })
            .into_iter()
            .map(|handle| handle.join().expect("confirm thread"))
            .collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let failure = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one confirmation fails");
    assert!(matches!(
        failure.as_ledger(),
        Some(LedgerError::InsufficientCoverage { .. })
    ));

    let offer = world.ledger.store().offer(offer.id).unwrap().unwrap();
    assert_eq!(offer.remaining_coverage, units(1));
    assert!(world.ledger.coverage().audit(offer.id).unwrap().is_balanced());
}

#[test]
fn parallel_aggregate_bids_fill_exactly_the_available_coverage() {
    let db = TempDb::create("aggregate");
    let world = World::with_store(db.ledger());
    let outcome = world.outcome(OutcomeType::GameWinHome);
    let offers: Vec<_> = (0..3)
        .map(|_| world.confirmed_offer(&outcome, dec!(1.8), 10))
        .collect();

    let outcomes: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = &world.ledger;
                let outcome_id = outcome.id;
                scope.spawn(move || {
                    ledger
                        .allocation()
                        .aggregate_bid(BIDDER, outcome_id, odds(dec!(1.8)), units(5))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("allocation thread"))
            .collect()
    });

    let filled: Vec<_> = outcomes.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(filled.len(), 6);
    for allocated in &filled {
        let total = Amount::checked_sum(allocated.iter().map(|a| a.allocation.amount));
        assert_eq!(total, Some(units(5)));
    }
    for failed in outcomes.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(
            failed.as_ledger(),
            Some(LedgerError::InsufficientCoverage { .. })
        ));
    }

    let store = world.ledger.store();
    for offer in &offers {
        let offer = store.offer(offer.id).unwrap().unwrap();
        assert_eq!(offer.held_coverage, units(10));
        assert_eq!(offer.available_coverage(), Amount::ZERO);
    }
}
