//! Database model types for Diesel ORM.
//!
//! Timestamps are stored as naive UTC. Row types convert into domain
//! entities with `From`; insertable rows are built from the domain's
//! `New*` structs.

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;

use super::schema::{bids, coverage_entries, escrows, events, offers, outcomes, wallets};
use crate::domain::{
    Amount, Bid, BidId, CoverageEntry, Escrow, EscrowId, Event, EventId, NewBid, NewEscrow,
    NewEvent, NewOffer, NewOutcome, Odds, Offer, OfferId, Outcome, OutcomeId, RecordHash, TxHash,
    UserId, Wallet, WalletId,
};

fn utc(naive: NaiveDateTime) -> DateTime<Utc> {
    naive.and_utc()
}

/// Database row for an event.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EventRow {
    pub id: i32,
    pub guid: String,
    pub name: String,
    pub start_date: NaiveDateTime,
    pub is_open: bool,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId::new(row.id),
            guid: row.guid,
            name: row.name,
            start_date: utc(row.start_date),
            is_open: row.is_open,
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = events)]
pub struct NewEventRow<'a> {
    pub guid: &'a str,
    pub name: &'a str,
    pub start_date: NaiveDateTime,
    pub is_open: bool,
}

impl<'a> From<&'a NewEvent> for NewEventRow<'a> {
    fn from(event: &'a NewEvent) -> Self {
        Self {
            guid: &event.guid,
            name: &event.name,
            start_date: event.start_date.naive_utc(),
            is_open: true,
        }
    }
}

/// Database row for an outcome.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = outcomes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OutcomeRow {
    pub id: i32,
    pub event_id: i32,
    pub type_id: i32,
    pub name: String,
    pub open_date: NaiveDateTime,
    pub close_date: NaiveDateTime,
    pub is_open: bool,
    pub total_riding: i64,
    pub result: Option<bool>,
}

impl From<OutcomeRow> for Outcome {
    fn from(row: OutcomeRow) -> Self {
        Self {
            id: OutcomeId::new(row.id),
            event_id: EventId::new(row.event_id),
            type_id: row.type_id,
            name: row.name,
            open_date: utc(row.open_date),
            close_date: utc(row.close_date),
            is_open: row.is_open,
            total_riding: Amount::from_minor(row.total_riding),
            result: row.result,
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = outcomes)]
pub struct NewOutcomeRow<'a> {
    pub event_id: i32,
    pub type_id: i32,
    pub name: &'a str,
    pub open_date: NaiveDateTime,
    pub close_date: NaiveDateTime,
    pub is_open: bool,
    pub total_riding: i64,
}

impl<'a> From<&'a NewOutcome> for NewOutcomeRow<'a> {
    fn from(outcome: &'a NewOutcome) -> Self {
        Self {
            event_id: outcome.event_id.value(),
            type_id: outcome.type_id,
            name: &outcome.name,
            open_date: outcome.open_date.naive_utc(),
            close_date: outcome.close_date.naive_utc(),
            is_open: true,
            total_riding: 0,
        }
    }
}

/// Database row for an offer.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = offers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OfferRow {
    pub id: i32,
    pub user_id: i64,
    pub outcome_id: i32,
    pub odds: i64,
    pub coverage: i64,
    pub remaining_coverage: i64,
    pub held_coverage: i64,
    pub hash: String,
    pub tx_hash: Option<String>,
    pub result: Option<bool>,
    pub created_at: NaiveDateTime,
}

impl From<OfferRow> for Offer {
    fn from(row: OfferRow) -> Self {
        Self {
            id: OfferId::new(row.id),
            user_id: UserId::new(row.user_id),
            outcome_id: OutcomeId::new(row.outcome_id),
            odds: Odds::from_hundredths(row.odds),
            coverage: Amount::from_minor(row.coverage),
            remaining_coverage: Amount::from_minor(row.remaining_coverage),
            held_coverage: Amount::from_minor(row.held_coverage),
            hash: RecordHash::from(row.hash),
            tx_hash: row.tx_hash.map(TxHash::from),
            result: row.result,
            created_at: utc(row.created_at),
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = offers)]
pub struct NewOfferRow<'a> {
    pub user_id: i64,
    pub outcome_id: i32,
    pub odds: i64,
    pub coverage: i64,
    pub remaining_coverage: i64,
    pub held_coverage: i64,
    pub hash: &'a str,
    pub created_at: NaiveDateTime,
}

impl<'a> NewOfferRow<'a> {
    pub fn new(offer: &'a NewOffer, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id: offer.user_id.value(),
            outcome_id: offer.outcome_id.value(),
            odds: offer.odds.hundredths(),
            coverage: offer.coverage.minor(),
            remaining_coverage: offer.coverage.minor(),
            held_coverage: 0,
            hash: offer.hash.as_str(),
            created_at: created_at.naive_utc(),
        }
    }
}

/// Database row for a bid.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = bids)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BidRow {
    pub id: i32,
    pub offer_id: i32,
    pub user_id: i64,
    pub value: i64,
    pub hash: String,
    pub tx_hash: Option<String>,
    pub result: Option<bool>,
    pub is_paid: bool,
    pub created_at: NaiveDateTime,
}

impl From<BidRow> for Bid {
    fn from(row: BidRow) -> Self {
        Self {
            id: BidId::new(row.id),
            offer_id: OfferId::new(row.offer_id),
            user_id: UserId::new(row.user_id),
            value: Amount::from_minor(row.value),
            hash: RecordHash::from(row.hash),
            tx_hash: row.tx_hash.map(TxHash::from),
            result: row.result,
            is_paid: row.is_paid,
            created_at: utc(row.created_at),
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = bids)]
pub struct NewBidRow<'a> {
    pub offer_id: i32,
    pub user_id: i64,
    pub value: i64,
    pub hash: &'a str,
    pub is_paid: bool,
    pub created_at: NaiveDateTime,
}

impl<'a> NewBidRow<'a> {
    pub fn new(bid: &'a NewBid, created_at: DateTime<Utc>) -> Self {
        Self {
            offer_id: bid.offer_id.value(),
            user_id: bid.user_id.value(),
            value: bid.value.minor(),
            hash: bid.hash.as_str(),
            is_paid: false,
            created_at: created_at.naive_utc(),
        }
    }
}

/// Database row for a coverage journal entry.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = coverage_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CoverageEntryRow {
    pub id: i32,
    pub offer_id: i32,
    pub bid_id: i32,
    pub amount: i64,
    pub recorded_at: NaiveDateTime,
}

impl From<CoverageEntryRow> for CoverageEntry {
    fn from(row: CoverageEntryRow) -> Self {
        Self {
            offer_id: OfferId::new(row.offer_id),
            bid_id: BidId::new(row.bid_id),
            amount: Amount::from_minor(row.amount),
            recorded_at: utc(row.recorded_at),
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = coverage_entries)]
pub struct NewCoverageEntryRow {
    pub offer_id: i32,
    pub bid_id: i32,
    pub amount: i64,
    pub recorded_at: NaiveDateTime,
}

/// Database row for a wallet.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = wallets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WalletRow {
    pub id: i32,
    pub user_id: i64,
    pub address: String,
}

impl From<WalletRow> for Wallet {
    fn from(row: WalletRow) -> Self {
        Self {
            id: WalletId::new(row.id),
            user_id: UserId::new(row.user_id),
            address: row.address,
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = wallets)]
pub struct NewWalletRow<'a> {
    pub user_id: i64,
    pub address: &'a str,
}

/// Database row for an escrow.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = escrows)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EscrowRow {
    pub id: i32,
    pub offer_id: i32,
    pub bid_id: i32,
    pub wallet_id: i32,
    pub commission: i64,
    pub value: i64,
    pub active: bool,
    pub incoming_hash: String,
    pub payout_hash: Option<String>,
    pub payout_date: Option<NaiveDateTime>,
}

impl From<EscrowRow> for Escrow {
    fn from(row: EscrowRow) -> Self {
        Self {
            id: EscrowId::new(row.id),
            offer_id: OfferId::new(row.offer_id),
            bid_id: BidId::new(row.bid_id),
            wallet_id: WalletId::new(row.wallet_id),
            commission: Amount::from_minor(row.commission),
            value: Amount::from_minor(row.value),
            active: row.active,
            incoming_hash: TxHash::from(row.incoming_hash),
            payout_hash: row.payout_hash.map(TxHash::from),
            payout_date: row.payout_date.map(utc),
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = escrows)]
pub struct NewEscrowRow<'a> {
    pub offer_id: i32,
    pub bid_id: i32,
    pub wallet_id: i32,
    pub commission: i64,
    pub value: i64,
    pub active: bool,
    pub incoming_hash: &'a str,
}

impl<'a> From<&'a NewEscrow> for NewEscrowRow<'a> {
    fn from(escrow: &'a NewEscrow) -> Self {
        Self {
            offer_id: escrow.offer_id.value(),
            bid_id: escrow.bid_id.value(),
            wallet_id: escrow.wallet_id.value(),
            commission: escrow.split.commission.minor(),
            value: escrow.split.value.minor(),
            active: true,
            incoming_hash: escrow.incoming_hash.as_str(),
        }
    }
}
