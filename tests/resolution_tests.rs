mod support;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use stakebook::domain::{OutcomeType, Standing};
use stakebook::error::{ErrorKind, LedgerError};
use stakebook::port::outbound::ledger::{OutcomeStore, PositionStore};
use stakebook::port::outbound::notifier::Notification;
use stakebook::testkit::domain::{game_data, scheduled_game, units};
use support::world::World;

#[test]
fn resolution_marks_confirmed_records_on_opposite_sides() {
    let world = World::new();
    let outcome = world.outcome(OutcomeType::NoRunsHome);
    let offer = world.confirmed_offer(&outcome, dec!(2.5), 10);
    let confirmed = world.confirmed_bid(&offer, 2);
    let provisional = world.bid(&offer, units(1));

    let report = world
        .ledger
        .resolution()
        .resolve(outcome.id, &game_data(0, 3))
        .unwrap();

    assert!(report.proposition);
    assert!(!report.already_resolved);
    assert_eq!(report.offers_marked, 1);
    assert_eq!(report.bids_marked, 1);

    let store = world.ledger.store();
    let outcome = store.outcome(outcome.id).unwrap().unwrap();
    assert!(!outcome.is_open);
    assert_eq!(outcome.result, Some(true));
    assert_eq!(store.offer(offer.id).unwrap().unwrap().result, Some(false));
    assert_eq!(store.bid(confirmed.id).unwrap().unwrap().result, Some(true));
    assert_eq!(store.bid(provisional.id).unwrap().unwrap().result, None);

    let query = world.ledger.query();
    assert_eq!(query.offer_status(&offer.hash).unwrap(), Standing::Lost);
    assert_eq!(query.bid_status(&confirmed.hash).unwrap(), Standing::Won);
    assert_eq!(query.bid_status(&provisional.hash).unwrap(), Standing::Pending);

    assert!(world.notifier.events().iter().any(|event| matches!(
        event,
        Notification::OutcomeResolved { outcome_id, proposition: true } if *outcome_id == outcome.id
    )));
}

#[test]
fn resolving_twice_keeps_the_first_result() {
    let world = World::new();
    let outcome = world.outcome(OutcomeType::GameWinHome);
    let offer = world.confirmed_offer(&outcome, dec!(1.9), 10);
    let resolution = world.ledger.resolution();

    resolution.resolve(outcome.id, &game_data(5, 2)).unwrap();
    let notified = world.notifier.len();

    // Contradicting and even incomplete data are ignored once resolved.
    for data in [game_data(1, 4), scheduled_game()] {
        let report = resolution.resolve(outcome.id, &data).unwrap();
        assert!(report.already_resolved);
        assert!(report.proposition);
    }

    let store = world.ledger.store();
    assert_eq!(store.outcome(outcome.id).unwrap().unwrap().result, Some(true));
    assert_eq!(store.offer(offer.id).unwrap().unwrap().result, Some(false));
    assert_eq!(world.notifier.len(), notified);
}

#[test]
fn incomplete_data_changes_nothing() {
    let world = World::new();
    let outcome = world.outcome(OutcomeType::NoRunsAway);
    world.confirmed_offer(&outcome, dec!(2), 10);

    let err = world
        .ledger
        .resolution()
        .resolve(outcome.id, &scheduled_game())
        .unwrap_err();

    assert_eq!(
        err.as_ledger(),
        Some(&LedgerError::IncompleteData {
            field: "game.away.runs"
        })
    );
    assert_eq!(err.kind(), Some(ErrorKind::Validation));
    let outcome = world.ledger.store().outcome(outcome.id).unwrap().unwrap();
    assert!(outcome.is_open);
    assert_eq!(outcome.result, None);
}

#[test]
fn expired_outcomes_remain_resolvable() {
    let world = World::new();
    let outcome = world.outcome(OutcomeType::NoRunsHome);
    let offer = world.confirmed_offer(&outcome, dec!(2), 10);
    world
        .ledger
        .maintenance(&world.config)
        .expire_outcomes(Utc::now() + Duration::days(2))
        .unwrap();

    let report = world
        .ledger
        .resolution()
        .resolve(outcome.id, &game_data(2, 0))
        .unwrap();

    assert!(!report.proposition);
    assert_eq!(
        world.ledger.store().offer(offer.id).unwrap().unwrap().result,
        Some(true)
    );
}

#[test]
fn event_sweep_resolves_every_outcome_with_its_own_verifier() {
    let world = World::new();
    let seeding = world.ledger.seeding();
    let event = seeding
        .seed_event(&stakebook::testkit::domain::event(900, Utc::now()))
        .unwrap();
    let now = Utc::now();
    let mut ids = Vec::new();
    for kind in [OutcomeType::NoRunsAway, OutcomeType::GameWinHome, OutcomeType::GameWinAway] {
        let outcome = seeding
            .seed_outcome(
                event.id,
                kind.type_id(),
                now,
                now + Duration::hours(3),
                &scheduled_game(),
            )
            .unwrap();
        ids.push(outcome.id);
    }

    let results = world
        .ledger
        .resolution()
        .resolve_event(event.id, &game_data(4, 0))
        .unwrap();

    let propositions: Vec<_> = results
        .iter()
        .map(|(id, report)| (*id, report.proposition))
        .collect();
    assert_eq!(
        propositions,
        vec![(ids[0], true), (ids[1], true), (ids[2], false)]
    );
}

#[test]
fn unknown_outcome_is_not_found() {
    let world = World::new();
    let err = world
        .ledger
        .resolution()
        .resolve(stakebook::domain::OutcomeId::new(404), &game_data(0, 0))
        .unwrap_err();
    assert!(matches!(
        err.as_ledger(),
        Some(LedgerError::NotFound { entity: "outcome", .. })
    ));
}
