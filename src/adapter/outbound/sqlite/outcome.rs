//! Events, outcomes, resolution, and the spread query.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use diesel::prelude::*;
use tracing::debug;

use super::ledger::{find_outcome, last_insert_id, load_outcome, unique_or, SqliteLedger};
use crate::adapter::outbound::sqlite::database::model::{
    BidRow, EventRow, NewEventRow, NewOutcomeRow, OfferRow, OutcomeRow,
};
use crate::adapter::outbound::sqlite::database::schema::{bids, events, offers, outcomes};
use crate::domain::resolution::{bid_result, offer_result};
use crate::domain::{
    Bid, CloseWindow, Event, EventId, NewEvent, NewOutcome, Offer, OfferBook, OfferId, Outcome,
    OutcomeFilter, OutcomeId, ResolutionReport, Spread,
};
use crate::error::{Error, LedgerError, Result};
use crate::port::outbound::ledger::OutcomeStore;

impl OutcomeStore for SqliteLedger {
    fn insert_event(&self, event: &NewEvent) -> Result<Event> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| {
            diesel::insert_into(events::table)
                .values(NewEventRow::from(event))
                .execute(conn)
                .map_err(|e| unique_or(e, LedgerError::validation("guid", "already recorded")))?;
            let id = last_insert_id(conn)?;
            let row = events::table
                .find(id)
                .select(EventRow::as_select())
                .first(conn)?;
            Ok(Event::from(row))
        })
    }

    fn event(&self, id: EventId) -> Result<Option<Event>> {
        let mut conn = self.conn()?;
        let row = events::table
            .find(id.value())
            .select(EventRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Event::from))
    }

    fn event_by_guid(&self, guid: &str) -> Result<Option<Event>> {
        let mut conn = self.conn()?;
        let row = events::table
            .filter(events::guid.eq(guid))
            .select(EventRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Event::from))
    }

    fn insert_outcome(&self, outcome: &NewOutcome) -> Result<Outcome> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| {
            let event_exists: i64 = events::table
                .filter(events::id.eq(outcome.event_id.value()))
                .count()
                .get_result(conn)?;
            if event_exists == 0 {
                return Err(LedgerError::not_found("event", outcome.event_id).into());
            }

            diesel::insert_into(outcomes::table)
                .values(NewOutcomeRow::from(outcome))
                .execute(conn)?;
            let id = last_insert_id(conn)?;
            load_outcome(conn, OutcomeId::new(id))
        })
    }

    fn outcome(&self, id: OutcomeId) -> Result<Option<Outcome>> {
        let mut conn = self.conn()?;
        find_outcome(&mut conn, id)
    }

    fn outcomes_for_event(&self, id: EventId) -> Result<Vec<Outcome>> {
        let mut conn = self.conn()?;
        let rows = outcomes::table
            .filter(outcomes::event_id.eq(id.value()))
            .order(outcomes::id.asc())
            .select(OutcomeRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Outcome::from).collect())
    }

    fn list_outcomes(&self, filter: &OutcomeFilter) -> Result<Vec<Outcome>> {
        let mut conn = self.conn()?;
        let mut query = outcomes::table
            .select(OutcomeRow::as_select())
            .into_boxed();

        match filter.window {
            CloseWindow::Any => {}
            CloseWindow::Range { start, end } => {
                query = query
                    .filter(outcomes::close_date.ge(start.naive_utc()))
                    .filter(outcomes::close_date.le(end.naive_utc()));
            }
            CloseWindow::On(day) => {
                let start = day.and_time(NaiveTime::MIN);
                query = query
                    .filter(outcomes::close_date.ge(start))
                    .filter(outcomes::close_date.lt(start + Duration::days(1)));
            }
            CloseWindow::Before(t) => {
                query = query.filter(outcomes::close_date.lt(t.naive_utc()));
            }
            CloseWindow::After(t) => {
                query = query.filter(outcomes::close_date.ge(t.naive_utc()));
            }
        }
        if let Some(is_open) = filter.is_open {
            query = query.filter(outcomes::is_open.eq(is_open));
        }

        let rows = query
            .order((outcomes::close_date.asc(), outcomes::id.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Outcome::from).collect())
    }

    fn expire_outcomes(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut conn = self.conn()?;
        let closed = diesel::update(
            outcomes::table
                .filter(outcomes::is_open.eq(true))
                .filter(outcomes::close_date.lt(now.naive_utc())),
        )
        .set(outcomes::is_open.eq(false))
        .execute(&mut conn)?;
        debug!(closed, "expired outcomes");
        Ok(closed)
    }

    fn resolve_outcome(&self, id: OutcomeId, proposition: bool) -> Result<ResolutionReport> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| {
            let outcome = load_outcome(conn, id)?;
            if let Some(existing) = outcome.result {
                return Ok(ResolutionReport {
                    proposition: existing,
                    already_resolved: true,
                    offers_marked: 0,
                    bids_marked: 0,
                });
            }

            diesel::update(outcomes::table.find(id.value()).filter(outcomes::result.is_null()))
                .set((
                    outcomes::is_open.eq(false),
                    outcomes::result.eq(Some(proposition)),
                ))
                .execute(conn)?;

            let offers_marked = diesel::update(
                offers::table
                    .filter(offers::outcome_id.eq(id.value()))
                    .filter(offers::tx_hash.is_not_null()),
            )
            .set(offers::result.eq(Some(offer_result(proposition))))
            .execute(conn)?;

            let confirmed_offer_ids = offers::table
                .filter(offers::outcome_id.eq(id.value()))
                .filter(offers::tx_hash.is_not_null())
                .select(offers::id);
            let bids_marked = diesel::update(
                bids::table
                    .filter(bids::tx_hash.is_not_null())
                    .filter(bids::offer_id.eq_any(confirmed_offer_ids)),
            )
            .set(bids::result.eq(Some(bid_result(proposition))))
            .execute(conn)?;

            debug!(outcome_id = %id, offers_marked, bids_marked, "marked resolution");
            Ok(ResolutionReport {
                proposition,
                already_resolved: false,
                offers_marked,
                bids_marked,
            })
        })
    }

    fn spread(&self, id: OutcomeId) -> Result<Option<Spread>> {
        let mut conn = self.conn()?;
        conn.transaction::<_, Error, _>(|conn| {
            let Some(outcome) = find_outcome(conn, id)? else {
                return Ok(None);
            };
            let event = events::table
                .find(outcome.event_id.value())
                .select(EventRow::as_select())
                .first(conn)
                .map(Event::from)?;

            let offer_rows = offers::table
                .filter(offers::outcome_id.eq(id.value()))
                .filter(offers::tx_hash.is_not_null())
                .order(offers::id.asc())
                .select(OfferRow::as_select())
                .load(conn)?;
            let offer_ids: Vec<i32> = offer_rows.iter().map(|o| o.id).collect();

            let bid_rows = bids::table
                .filter(bids::offer_id.eq_any(&offer_ids))
                .filter(bids::tx_hash.is_not_null())
                .order(bids::id.asc())
                .select(BidRow::as_select())
                .load(conn)?;
            let mut by_offer: HashMap<OfferId, Vec<Bid>> = HashMap::new();
            for bid in bid_rows.into_iter().map(Bid::from) {
                by_offer.entry(bid.offer_id).or_default().push(bid);
            }

            let offers = offer_rows
                .into_iter()
                .map(Offer::from)
                .map(|offer| {
                    let bids = by_offer.remove(&offer.id).unwrap_or_default();
                    OfferBook { offer, bids }
                })
                .collect();

            Ok(Some(Spread {
                event,
                outcome,
                offers,
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    use super::super::ledger::fixtures::{self, BIDDER};
    use crate::domain::{CloseWindow, NewEvent, NewOutcome, Odds, OutcomeFilter, Standing};
    use crate::error::LedgerError;
    use crate::port::outbound::ledger::{OutcomeStore, PositionStore};

    fn odds() -> Odds {
        Odds::try_new(dec!(2.5)).unwrap()
    }

    #[test]
    fn duplicate_event_guid_is_rejected() {
        let ledger = fixtures::ledger();
        let event = NewEvent {
            guid: "g-1".into(),
            name: "Cubs at Mets".into(),
            start_date: Utc::now(),
        };
        ledger.insert_event(&event).unwrap();
        let err = ledger.insert_event(&event).unwrap_err();
        assert!(matches!(err.as_ledger(), Some(LedgerError::Validation { field: "guid", .. })));
        assert!(ledger.event_by_guid("g-1").unwrap().is_some());
    }

    #[test]
    fn outcome_requires_existing_event() {
        let ledger = fixtures::ledger();
        let err = ledger
            .insert_outcome(&NewOutcome {
                event_id: crate::domain::EventId::new(42),
                type_id: 0,
                name: "x".into(),
                open_date: Utc::now(),
                close_date: Utc::now(),
            })
            .unwrap_err();
        assert!(matches!(err.as_ledger(), Some(LedgerError::NotFound { entity: "event", .. })));
    }

    #[test]
    fn resolution_marks_only_confirmed_records() {
        let ledger = fixtures::ledger();
        let outcome = fixtures::outcome(&ledger);
        let offer = fixtures::confirmed_offer(&ledger, &outcome, odds(), 1_000);
        let confirmed = fixtures::confirmed_bid(&ledger, &offer, 100);
        let provisional = fixtures::bid(&ledger, &offer, 50);

        let report = ledger.resolve_outcome(outcome.id, true).unwrap();
        assert!(!report.already_resolved);
        assert_eq!(report.offers_marked, 1);
        assert_eq!(report.bids_marked, 1);

        let offer = ledger.offer(offer.id).unwrap().unwrap();
        assert_eq!(offer.standing(), Standing::Lost);
        assert_eq!(ledger.bid(confirmed.id).unwrap().unwrap().result, Some(true));
        assert_eq!(ledger.bid(provisional.id).unwrap().unwrap().result, None);

        let outcome = ledger.outcome(outcome.id).unwrap().unwrap();
        assert!(!outcome.is_open);
        assert_eq!(outcome.result, Some(true));
    }

    #[test]
    fn second_resolution_is_a_no_op() {
        let ledger = fixtures::ledger();
        let outcome = fixtures::outcome(&ledger);
        let offer = fixtures::confirmed_offer(&ledger, &outcome, odds(), 1_000);
        fixtures::confirmed_bid(&ledger, &offer, 100);

        ledger.resolve_outcome(outcome.id, false).unwrap();
        let again = ledger.resolve_outcome(outcome.id, true).unwrap();

        assert!(again.already_resolved);
        assert!(!again.proposition);
        assert_eq!(ledger.offer(offer.id).unwrap().unwrap().result, Some(true));
    }

    #[test]
    fn expiry_closes_only_past_outcomes() {
        let ledger = fixtures::ledger();
        let outcome = fixtures::outcome(&ledger);

        assert_eq!(ledger.expire_outcomes(outcome.close_date).unwrap(), 0);
        assert_eq!(
            ledger
                .expire_outcomes(outcome.close_date + Duration::seconds(1))
                .unwrap(),
            1
        );
        assert!(!ledger.outcome(outcome.id).unwrap().unwrap().is_open);
    }

    #[test]
    fn list_outcomes_applies_window_and_open_flag() {
        let ledger = fixtures::ledger();
        let outcome = fixtures::outcome(&ledger);
        let day = outcome.close_date.date_naive();

        let on_day = OutcomeFilter {
            window: CloseWindow::On(day),
            is_open: Some(true),
        };
        assert_eq!(ledger.list_outcomes(&on_day).unwrap().len(), 1);

        let closed_only = OutcomeFilter {
            window: CloseWindow::Any,
            is_open: Some(false),
        };
        assert!(ledger.list_outcomes(&closed_only).unwrap().is_empty());

        let long_ago = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let before = OutcomeFilter {
            window: CloseWindow::Before(long_ago),
            is_open: None,
        };
        assert!(ledger.list_outcomes(&before).unwrap().is_empty());
    }

    #[test]
    fn spread_lists_confirmed_positions() {
        let ledger = fixtures::ledger();
        let outcome = fixtures::outcome(&ledger);
        let first = fixtures::confirmed_offer(&ledger, &outcome, odds(), 1_000);
        let second = fixtures::confirmed_offer(&ledger, &outcome, odds(), 500);
        fixtures::confirmed_bid(&ledger, &first, 100);
        fixtures::confirmed_bid(&ledger, &second, 40);
        fixtures::bid(&ledger, &second, 10);

        let spread = ledger.spread(outcome.id).unwrap().unwrap();
        assert_eq!(spread.offers.len(), 2);
        assert_eq!(spread.offers[0].offer.id, first.id);
        assert_eq!(spread.offers[1].bids.len(), 1);
        assert_eq!(spread.bid_count(), 2);
        assert!(spread.offers.iter().flat_map(|b| &b.bids).all(|b| b.user_id == BIDDER));
    }
}
