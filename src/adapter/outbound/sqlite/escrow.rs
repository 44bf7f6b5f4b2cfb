//! Wallets, escrows, and payout bookkeeping.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use super::ledger::{last_insert_id, load_offer, unique_or, SqliteLedger};
use crate::adapter::outbound::sqlite::database::model::{
    BidRow, EscrowRow, NewEscrowRow, NewWalletRow, WalletRow,
};
use crate::adapter::outbound::sqlite::database::schema::{bids, escrows, wallets};
use crate::domain::{
    Bid, BidId, Escrow, EscrowId, NewEscrow, TxHash, UserId, Wallet, WalletId,
};
use crate::error::{Error, LedgerError, Result};
use crate::port::outbound::ledger::{EscrowStore, FundingClaim, SettlementContext};

fn find_escrow(conn: &mut SqliteConnection, id: EscrowId) -> Result<Option<Escrow>> {
    let row = escrows::table
        .find(id.value())
        .select(EscrowRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(Escrow::from))
}

fn load_escrow(conn: &mut SqliteConnection, id: EscrowId) -> Result<Escrow> {
    find_escrow(conn, id)?.ok_or_else(|| LedgerError::not_found("escrow", id).into())
}

fn find_escrow_by_incoming(conn: &mut SqliteConnection, hash: &TxHash) -> Result<Option<Escrow>> {
    let row = escrows::table
        .filter(escrows::incoming_hash.eq(hash.as_str()))
        .select(EscrowRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(Escrow::from))
}

fn find_escrow_for_bid(conn: &mut SqliteConnection, bid_id: BidId) -> Result<Option<Escrow>> {
    let row = escrows::table
        .filter(escrows::bid_id.eq(bid_id.value()))
        .select(EscrowRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(Escrow::from))
}

impl EscrowStore for SqliteLedger {
    fn insert_wallet(&self, user: UserId, address: &str) -> Result<Wallet> {
        if address.trim().is_empty() {
            return Err(LedgerError::validation("address", "must not be blank").into());
        }
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| {
            diesel::insert_into(wallets::table)
                .values(NewWalletRow {
                    user_id: user.value(),
                    address,
                })
                .execute(conn)
                .map_err(|e| unique_or(e, LedgerError::validation("address", "already registered")))?;
            let id = last_insert_id(conn)?;
            let row = wallets::table
                .find(id)
                .select(WalletRow::as_select())
                .first(conn)?;
            Ok(Wallet::from(row))
        })
    }

    fn wallet(&self, id: WalletId) -> Result<Option<Wallet>> {
        let mut conn = self.conn()?;
        let row = wallets::table
            .find(id.value())
            .select(WalletRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Wallet::from))
    }

    fn wallet_for_user(&self, user: UserId) -> Result<Option<Wallet>> {
        let mut conn = self.conn()?;
        let row = wallets::table
            .filter(wallets::user_id.eq(user.value()))
            .order(wallets::id.desc())
            .select(WalletRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Wallet::from))
    }

    fn claim_funding(&self, bid_id: BidId, claim: &str) -> Result<FundingClaim> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| {
            if let Some(existing) = find_escrow_for_bid(conn, bid_id)? {
                return Ok(FundingClaim::Funded(existing));
            }

            let claimed = diesel::update(
                bids::table
                    .find(bid_id.value())
                    .filter(bids::funding_claim.is_null()),
            )
            .set(bids::funding_claim.eq(claim))
            .execute(conn)?;
            if claimed == 1 {
                return Ok(FundingClaim::Claimed);
            }

            let known = bids::table
                .find(bid_id.value())
                .select(bids::id)
                .first::<i32>(conn)
                .optional()?;
            match known {
                None => Err(LedgerError::not_found("bid", bid_id).into()),
                Some(_) => Err(LedgerError::TransferInFlight {
                    entity: "bid",
                    id: bid_id.value(),
                }
                .into()),
            }
        })
    }

    fn release_funding_claim(&self, bid_id: BidId, claim: &str) -> Result<()> {
        let mut conn = self.conn()?;
        diesel::update(
            bids::table
                .find(bid_id.value())
                .filter(bids::funding_claim.eq(claim)),
        )
        .set(bids::funding_claim.eq(None::<&str>))
        .execute(&mut conn)?;
        Ok(())
    }

    fn record_escrow(&self, escrow: &NewEscrow) -> Result<Escrow> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| {
            if let Some(existing) = find_escrow_by_incoming(conn, &escrow.incoming_hash)? {
                if existing.bid_id != escrow.bid_id {
                    return Err(LedgerError::DuplicateHash { entity: "escrow" }.into());
                }
                debug!(escrow_id = %existing.id, "escrow already recorded");
                return Ok(existing);
            }

            let funded = LedgerError::AlreadyFunded {
                bid_id: escrow.bid_id.value(),
            };
            if find_escrow_for_bid(conn, escrow.bid_id)?.is_some() {
                return Err(funded.into());
            }
            diesel::insert_into(escrows::table)
                .values(NewEscrowRow::from(escrow))
                .execute(conn)
                .map_err(|e| unique_or(e, funded))?;
            let id = last_insert_id(conn)?;

            diesel::update(bids::table.find(escrow.bid_id.value()))
                .set(bids::funding_claim.eq(None::<&str>))
                .execute(conn)?;
            load_escrow(conn, EscrowId::new(id))
        })
    }

    fn escrow(&self, id: EscrowId) -> Result<Option<Escrow>> {
        let mut conn = self.conn()?;
        find_escrow(&mut conn, id)
    }

    fn escrows_for_bid(&self, bid_id: BidId) -> Result<Vec<Escrow>> {
        let mut conn = self.conn()?;
        let rows = escrows::table
            .filter(escrows::bid_id.eq(bid_id.value()))
            .order(escrows::id.asc())
            .select(EscrowRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Escrow::from).collect())
    }

    fn settlement_context(&self, id: EscrowId) -> Result<SettlementContext> {
        let mut conn = self.conn()?;
        conn.transaction::<_, Error, _>(|conn| {
            let escrow = load_escrow(conn, id)?;
            let bid = bids::table
                .find(escrow.bid_id.value())
                .select(BidRow::as_select())
                .first(conn)
                .optional()?
                .map(Bid::from)
                .ok_or_else(|| LedgerError::not_found("bid", escrow.bid_id))?;
            let offer = load_offer(conn, escrow.offer_id)?;
            Ok(SettlementContext { escrow, bid, offer })
        })
    }

    fn claim_payout(&self, id: EscrowId, claim: &str) -> Result<()> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| {
            let claimed = diesel::update(
                escrows::table
                    .find(id.value())
                    .filter(escrows::active.eq(true))
                    .filter(escrows::payout_claim.is_null()),
            )
            .set(escrows::payout_claim.eq(claim))
            .execute(conn)?;
            if claimed == 1 {
                return Ok(());
            }

            let escrow = load_escrow(conn, id)?;
            if escrow.active {
                Err(LedgerError::TransferInFlight {
                    entity: "escrow",
                    id: id.value(),
                }
                .into())
            } else {
                Err(LedgerError::EscrowInactive {
                    escrow_id: id.value(),
                }
                .into())
            }
        })
    }

    fn release_payout_claim(&self, id: EscrowId, claim: &str) -> Result<()> {
        let mut conn = self.conn()?;
        diesel::update(
            escrows::table
                .find(id.value())
                .filter(escrows::active.eq(true))
                .filter(escrows::payout_claim.eq(claim)),
        )
        .set(escrows::payout_claim.eq(None::<&str>))
        .execute(&mut conn)?;
        Ok(())
    }

    fn complete_payout(&self, id: EscrowId, tx_hash: &TxHash, at: DateTime<Utc>) -> Result<Escrow> {
        if tx_hash.is_blank() {
            return Err(LedgerError::validation("tx_hash", "must not be blank").into());
        }
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| {
            let updated = diesel::update(
                escrows::table
                    .find(id.value())
                    .filter(escrows::active.eq(true)),
            )
            .set((
                escrows::active.eq(false),
                escrows::payout_hash.eq(tx_hash.as_str()),
                escrows::payout_claim.eq(None::<&str>),
                escrows::payout_date.eq(at.naive_utc()),
            ))
            .execute(conn)
            .map_err(|e| unique_or(e, LedgerError::PayoutConflict { escrow_id: id.value() }))?;

            let escrow = load_escrow(conn, id)?;
            if updated == 0 {
                return match &escrow.payout_hash {
                    Some(existing) if existing == tx_hash => Ok(escrow),
                    _ => Err(LedgerError::PayoutConflict {
                        escrow_id: id.value(),
                    }
                    .into()),
                };
            }

            diesel::update(bids::table.find(escrow.bid_id.value()))
                .set(bids::is_paid.eq(true))
                .execute(conn)?;
            Ok(escrow)
        })
    }
}
