//! Offers, bids, coverage holds and decrements, confirmation, and pruning.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer};
use diesel::SqliteConnection;
use tracing::debug;

use super::ledger::{
    find_offer, last_insert_id, load_offer, load_open_outcome, unique_or, SqliteLedger,
};
use crate::adapter::outbound::sqlite::database::model::{
    BidRow, CoverageEntryRow, NewBidRow, NewCoverageEntryRow, NewOfferRow, OfferRow,
};
use crate::adapter::outbound::sqlite::database::schema::{
    bids, coverage_entries, offers, outcomes,
};
use crate::domain::allocation::{plan, Candidate};
use crate::domain::confirmation::{ensure_confirmable, validate_tx_hash};
use crate::domain::{
    ActivePositions, Amount, Bid, BidConfirmation, BidId, CoverageEntry, NewBid, NewOffer, Offer,
    OfferId, RecordHash, TxHash, UserId,
};
use crate::error::{Error, LedgerError, Result};
use crate::port::outbound::ledger::{AggregateRequest, AllocatedBid, PositionStore, PruneReport};

fn find_bid_by_hash(conn: &mut SqliteConnection, hash: &RecordHash) -> Result<Option<Bid>> {
    let row = bids::table
        .filter(bids::hash.eq(hash.as_str()))
        .select(BidRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(Bid::from))
}

fn load_bid(conn: &mut SqliteConnection, id: BidId) -> Result<Bid> {
    let row = bids::table
        .find(id.value())
        .select(BidRow::as_select())
        .first(conn)
        .optional()?;
    row.map(Bid::from)
        .ok_or_else(|| LedgerError::not_found("bid", id).into())
}

fn find_offer_by_hash(conn: &mut SqliteConnection, hash: &RecordHash) -> Result<Option<Offer>> {
    let row = offers::table
        .filter(offers::hash.eq(hash.as_str()))
        .select(OfferRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(Offer::from))
}

fn ensure_positive(amount: Amount) -> Result<()> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(LedgerError::validation("amount", "must be positive").into())
    }
}

/// Explain why a conditional coverage update matched no row.
fn coverage_failure(conn: &mut SqliteConnection, offer_id: OfferId, requested: Amount, holds: bool) -> Error {
    let offer = match load_offer(conn, offer_id) {
        Ok(offer) => offer,
        Err(err) => return err,
    };
    if !offer.is_confirmed() {
        return LedgerError::OfferNotConfirmed {
            offer_id: offer_id.value(),
        }
        .into();
    }
    if let Err(err) = load_open_outcome(conn, offer.outcome_id) {
        return err;
    }
    let available = if holds {
        offer.available_coverage()
    } else {
        offer.remaining_coverage
    };
    LedgerError::InsufficientCoverage {
        requested,
        available,
    }
    .into()
}

/// Reserve coverage if enough is unconsumed and unheld. Returns whether a
/// row was updated.
fn try_hold(conn: &mut SqliteConnection, offer_id: OfferId, amount: Amount) -> Result<bool> {
    let updated = diesel::update(
        offers::table
            .filter(offers::id.eq(offer_id.value()))
            .filter(offers::tx_hash.is_not_null())
            .filter((offers::remaining_coverage - offers::held_coverage).ge(amount.minor())),
    )
    .set(offers::held_coverage.eq(offers::held_coverage + amount.minor()))
    .execute(conn)?;
    Ok(updated == 1)
}

/// The authoritative coverage decrement, journaled against `bid_id`.
///
/// Only a confirmed bid on `offer_id` may consume coverage, and only its
/// full value.
fn apply_decrement(conn: &mut SqliteConnection, offer_id: OfferId, bid_id: BidId, amount: Amount) -> Result<Offer> {
    ensure_positive(amount)?;
    load_offer(conn, offer_id)?;
    let bid = load_bid(conn, bid_id)?;
    if bid.offer_id != offer_id {
        return Err(LedgerError::validation("bid_id", format!("belongs to {}", bid.offer_id)).into());
    }
    if amount != bid.value {
        return Err(LedgerError::validation("amount", format!("must equal the bid value {}", bid.value)).into());
    }
    if !bid.is_confirmed() {
        return Err(LedgerError::BidNotConfirmed {
            bid_id: bid_id.value(),
        }
        .into());
    }

    let updated = diesel::sql_query(
        "UPDATE offers \
         SET remaining_coverage = remaining_coverage - ?, \
             held_coverage = MAX(held_coverage - ?, 0) \
         WHERE id = ? \
           AND tx_hash IS NOT NULL \
           AND remaining_coverage >= ? \
           AND outcome_id IN (SELECT id FROM outcomes WHERE is_open)",
    )
    .bind::<BigInt, _>(amount.minor())
    .bind::<BigInt, _>(amount.minor())
    .bind::<Integer, _>(offer_id.value())
    .bind::<BigInt, _>(amount.minor())
    .execute(conn)?;

    if updated == 0 {
        return Err(coverage_failure(conn, offer_id, amount, false));
    }

    diesel::insert_into(coverage_entries::table)
        .values(NewCoverageEntryRow {
            offer_id: offer_id.value(),
            bid_id: bid_id.value(),
            amount: amount.minor(),
            recorded_at: Utc::now().naive_utc(),
        })
        .execute(conn)
        .map_err(|e| unique_or(e, LedgerError::AlreadyConfirmed { entity: "bid" }))?;

    debug!(offer_id = %offer_id, bid_id = %bid_id, amount = %amount, "coverage decremented");
    load_offer(conn, offer_id)
}

fn insert_bid(conn: &mut SqliteConnection, bid: &NewBid) -> Result<Bid> {
    diesel::insert_into(bids::table)
        .values(NewBidRow::new(bid, Utc::now()))
        .execute(conn)
        .map_err(|e| unique_or(e, LedgerError::DuplicateHash { entity: "bid" }))?;
    let id = last_insert_id(conn)?;
    load_bid(conn, BidId::new(id))
}

/// Confirmed offers matching the request that still have unheld coverage,
/// oldest first.
fn allocation_candidates(
    conn: &mut SqliteConnection,
    request: &AggregateRequest,
    exclude: &HashSet<OfferId>,
) -> Result<Vec<Offer>> {
    let rows = offers::table
        .filter(offers::outcome_id.eq(request.outcome_id.value()))
        .filter(offers::odds.eq(request.odds.hundredths()))
        .filter(offers::tx_hash.is_not_null())
        .filter((offers::remaining_coverage - offers::held_coverage).gt(0))
        .order(offers::id.asc())
        .select(OfferRow::as_select())
        .load(conn)?;
    Ok(rows
        .into_iter()
        .map(Offer::from)
        .filter(|o| !exclude.contains(&o.id))
        .collect())
}

impl PositionStore for SqliteLedger {
    fn insert_offer(&self, offer: &NewOffer) -> Result<Offer> {
        ensure_positive(offer.coverage)?;
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| {
            load_open_outcome(conn, offer.outcome_id)?;
            diesel::insert_into(offers::table)
                .values(NewOfferRow::new(offer, Utc::now()))
                .execute(conn)
                .map_err(|e| unique_or(e, LedgerError::DuplicateHash { entity: "offer" }))?;
            let id = last_insert_id(conn)?;
            load_offer(conn, OfferId::new(id))
        })
    }

    fn offer(&self, id: OfferId) -> Result<Option<Offer>> {
        let mut conn = self.conn()?;
        find_offer(&mut conn, id)
    }

    fn offer_by_hash(&self, hash: &RecordHash) -> Result<Option<Offer>> {
        let mut conn = self.conn()?;
        find_offer_by_hash(&mut conn, hash)
    }

    fn bid(&self, id: BidId) -> Result<Option<Bid>> {
        let mut conn = self.conn()?;
        let row = bids::table
            .find(id.value())
            .select(BidRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Bid::from))
    }

    fn bid_by_hash(&self, hash: &RecordHash) -> Result<Option<Bid>> {
        let mut conn = self.conn()?;
        find_bid_by_hash(&mut conn, hash)
    }

    fn bids_for_offer(&self, id: OfferId) -> Result<Vec<Bid>> {
        let mut conn = self.conn()?;
        let rows = bids::table
            .filter(bids::offer_id.eq(id.value()))
            .order(bids::id.asc())
            .select(BidRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Bid::from).collect())
    }

    fn place_bid(&self, bid: &NewBid) -> Result<Bid> {
        ensure_positive(bid.value)?;
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| {
            let offer = load_offer(conn, bid.offer_id)?;
            if !offer.is_confirmed() {
                return Err(LedgerError::OfferNotConfirmed {
                    offer_id: offer.id.value(),
                }
                .into());
            }
            load_open_outcome(conn, offer.outcome_id)?;
            if bid.value > offer.remaining_coverage {
                return Err(LedgerError::InsufficientCoverage {
                    requested: bid.value,
                    available: offer.remaining_coverage,
                }
                .into());
            }

            // Single bids may overlap other holds; the decrement at
            // confirmation settles which one gets the coverage.
            diesel::update(offers::table.find(offer.id.value()))
                .set(offers::held_coverage.eq(offers::held_coverage + bid.value.minor()))
                .execute(conn)?;

            insert_bid(conn, bid)
        })
    }

    fn allocate(&self, request: &AggregateRequest) -> Result<Vec<AllocatedBid>> {
        ensure_positive(request.amount)?;
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| {
            load_open_outcome(conn, request.outcome_id)?;

            let mut used = HashSet::new();
            let mut allocated = Vec::new();
            let mut outstanding = request.amount;

            'plan: while outstanding.is_positive() {
                let offers = allocation_candidates(conn, request, &used)?;
                let candidates: Vec<Candidate> = offers
                    .iter()
                    .map(|o| Candidate {
                        offer_id: o.id,
                        available: o.available_coverage(),
                    })
                    .collect();

                let steps = plan(&candidates, outstanding).map_err(|err| match err {
                    LedgerError::InsufficientCoverage { available, .. } => {
                        let filled = request.amount.saturating_sub(outstanding);
                        LedgerError::InsufficientCoverage {
                            requested: request.amount,
                            available: filled.checked_add(available).unwrap_or(available),
                        }
                    }
                    other => other,
                })?;

                for step in steps {
                    if !try_hold(conn, step.offer_id, step.amount)? {
                        debug!(offer_id = %step.offer_id, "hold missed, re-planning");
                        continue 'plan;
                    }
                    let offer_tx_hash = offers
                        .iter()
                        .find(|o| o.id == step.offer_id)
                        .and_then(|o| o.tx_hash.clone())
                        .ok_or_else(|| LedgerError::OfferNotConfirmed {
                            offer_id: step.offer_id.value(),
                        })?;
                    let bid = insert_bid(
                        conn,
                        &NewBid {
                            user_id: request.user_id,
                            offer_id: step.offer_id,
                            value: step.amount,
                            hash: RecordHash::generate(),
                        },
                    )?;
                    used.insert(step.offer_id);
                    outstanding = outstanding.saturating_sub(step.amount);
                    allocated.push(AllocatedBid {
                        allocation: step,
                        bid,
                        offer_tx_hash,
                    });
                }
            }

            Ok(allocated)
        })
    }

    fn hold_coverage(&self, offer_id: OfferId, amount: Amount) -> Result<Offer> {
        ensure_positive(amount)?;
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| {
            let offer = load_offer(conn, offer_id)?;
            load_open_outcome(conn, offer.outcome_id)?;
            if !try_hold(conn, offer_id, amount)? {
                return Err(coverage_failure(conn, offer_id, amount, true));
            }
            load_offer(conn, offer_id)
        })
    }

    fn decrement_coverage(&self, offer_id: OfferId, bid_id: BidId, amount: Amount) -> Result<Offer> {
        ensure_positive(amount)?;
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| apply_decrement(conn, offer_id, bid_id, amount))
    }

    fn coverage_entries(&self, offer_id: OfferId) -> Result<Vec<CoverageEntry>> {
        let mut conn = self.conn()?;
        let rows = coverage_entries::table
            .filter(coverage_entries::offer_id.eq(offer_id.value()))
            .order(coverage_entries::id.asc())
            .select(CoverageEntryRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(CoverageEntry::from).collect())
    }

    fn confirm_offer(&self, hash: &RecordHash, tx_hash: &TxHash, caller: UserId) -> Result<Offer> {
        validate_tx_hash(tx_hash)?;
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| {
            let found = find_offer_by_hash(conn, hash)?;
            let offer = ensure_confirmable(found.as_ref(), hash, caller)?;
            load_open_outcome(conn, offer.outcome_id)?;

            let updated = diesel::update(
                offers::table
                    .find(offer.id.value())
                    .filter(offers::tx_hash.is_null()),
            )
            .set(offers::tx_hash.eq(tx_hash.as_str()))
            .execute(conn)?;
            if updated == 0 {
                return Err(LedgerError::AlreadyConfirmed { entity: "offer" }.into());
            }
            load_offer(conn, offer.id)
        })
    }

    fn confirm_bids(&self, items: &[BidConfirmation], caller: UserId) -> Result<Vec<Bid>> {
        if items.is_empty() {
            return Err(LedgerError::validation("bids", "batch is empty").into());
        }
        for item in items {
            validate_tx_hash(&item.tx_hash)?;
        }

        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| {
            let mut confirmed = Vec::with_capacity(items.len());
            for item in items {
                let found = find_bid_by_hash(conn, &item.bid_hash)?;
                let bid = ensure_confirmable(found.as_ref(), &item.bid_hash, caller)?;
                let offer = load_offer(conn, bid.offer_id)?;
                if !offer.is_confirmed() {
                    return Err(LedgerError::OfferNotConfirmed {
                        offer_id: offer.id.value(),
                    }
                    .into());
                }
                load_open_outcome(conn, offer.outcome_id)?;

                let updated = diesel::update(
                    bids::table
                        .find(bid.id.value())
                        .filter(bids::tx_hash.is_null()),
                )
                .set(bids::tx_hash.eq(item.tx_hash.as_str()))
                .execute(conn)?;
                if updated == 0 {
                    return Err(LedgerError::AlreadyConfirmed { entity: "bid" }.into());
                }

                apply_decrement(conn, offer.id, bid.id, bid.value)?;

                diesel::update(outcomes::table.find(offer.outcome_id.value()))
                    .set(outcomes::total_riding.eq(outcomes::total_riding + bid.value.minor()))
                    .execute(conn)?;

                confirmed.push(load_bid(conn, bid.id)?);
            }
            Ok(confirmed)
        })
    }

    fn prune_provisional(&self, cutoff: DateTime<Utc>) -> Result<PruneReport> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| {
            let stale: Vec<Bid> = bids::table
                .filter(bids::tx_hash.is_null())
                .filter(bids::created_at.lt(cutoff.naive_utc()))
                .select(BidRow::as_select())
                .load(conn)?
                .into_iter()
                .map(Bid::from)
                .collect();

            for bid in &stale {
                diesel::sql_query(
                    "UPDATE offers SET held_coverage = MAX(held_coverage - ?, 0) WHERE id = ?",
                )
                .bind::<BigInt, _>(bid.value.minor())
                .bind::<Integer, _>(bid.offer_id.value())
                .execute(conn)?;
            }

            let stale_ids: Vec<i32> = stale.iter().map(|b| b.id.value()).collect();
            let bids_removed = diesel::delete(bids::table.filter(bids::id.eq_any(&stale_ids)))
                .execute(conn)?;

            let offers_removed = diesel::delete(
                offers::table
                    .filter(offers::tx_hash.is_null())
                    .filter(offers::created_at.lt(cutoff.naive_utc()))
                    .filter(offers::id.ne_all(bids::table.select(bids::offer_id))),
            )
            .execute(conn)?;

            debug!(bids_removed, offers_removed, "pruned provisional records");
            Ok(PruneReport {
                bids_removed,
                offers_removed,
            })
        })
    }

    fn active_positions(&self, user: UserId) -> Result<ActivePositions> {
        let mut conn = self.conn()?;
        conn.transaction::<_, Error, _>(|conn| {
            let open_outcomes = outcomes::table
                .filter(outcomes::is_open.eq(true))
                .select(outcomes::id);

            let offers = offers::table
                .filter(offers::user_id.eq(user.value()))
                .filter(offers::tx_hash.is_not_null())
                .filter(offers::outcome_id.eq_any(open_outcomes))
                .order(offers::id.asc())
                .select(OfferRow::as_select())
                .load(conn)?
                .into_iter()
                .map(Offer::from)
                .collect();

            let open_offers = offers::table
                .filter(
                    offers::outcome_id.eq_any(
                        outcomes::table
                            .filter(outcomes::is_open.eq(true))
                            .select(outcomes::id),
                    ),
                )
                .select(offers::id);

            let bids = bids::table
                .filter(bids::user_id.eq(user.value()))
                .filter(bids::tx_hash.is_not_null())
                .filter(bids::offer_id.eq_any(open_offers))
                .order(bids::id.asc())
                .select(BidRow::as_select())
                .load(conn)?
                .into_iter()
                .map(Bid::from)
                .collect();

            Ok(ActivePositions { offers, bids })
        })
    }
}
