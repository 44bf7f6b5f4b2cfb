//! SQLite ledger store.
//!
//! One [`SqliteLedger`] implements every ledger port. Write paths run in
//! `BEGIN IMMEDIATE` transactions so that the read used to classify a
//! failed conditional update sees the same state the update did.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::SqliteConnection;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{OfferRow, OutcomeRow};
use crate::adapter::outbound::sqlite::database::schema::{offers, outcomes};
use crate::domain::{Offer, OfferId, Outcome, OutcomeId};
use crate::error::{Error, LedgerError, Result};

pub(super) type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// SQLite-backed ledger.
///
/// Implements [`OutcomeStore`](crate::port::outbound::ledger::OutcomeStore),
/// [`PositionStore`](crate::port::outbound::ledger::PositionStore) and
/// [`EscrowStore`](crate::port::outbound::ledger::EscrowStore).
pub struct SqliteLedger {
    pool: DbPool,
}

impl SqliteLedger {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub(super) fn conn(&self) -> Result<Conn> {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }
}

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = diesel::sql_types::Integer)]
    #[diesel(column_name = "id")]
    id: i32,
}

/// Row id of the last insert on this connection.
pub(super) fn last_insert_id(conn: &mut SqliteConnection) -> QueryResult<i32> {
    diesel::sql_query("SELECT last_insert_rowid() AS id")
        .get_result::<LastInsertRowId>(conn)
        .map(|row| row.id)
}

/// Turn a unique-constraint failure into `conflict`, anything else into a
/// database error.
pub(super) fn unique_or(err: DieselError, conflict: LedgerError) -> Error {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => conflict.into(),
        other => other.into(),
    }
}

pub(super) fn find_offer(conn: &mut SqliteConnection, id: OfferId) -> Result<Option<Offer>> {
    let row = offers::table
        .find(id.value())
        .select(OfferRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(Offer::from))
}

pub(super) fn load_offer(conn: &mut SqliteConnection, id: OfferId) -> Result<Offer> {
    find_offer(conn, id)?.ok_or_else(|| LedgerError::not_found("offer", id).into())
}

pub(super) fn find_outcome(conn: &mut SqliteConnection, id: OutcomeId) -> Result<Option<Outcome>> {
    let row = outcomes::table
        .find(id.value())
        .select(OutcomeRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(Outcome::from))
}

pub(super) fn load_outcome(conn: &mut SqliteConnection, id: OutcomeId) -> Result<Outcome> {
    find_outcome(conn, id)?.ok_or_else(|| LedgerError::not_found("outcome", id).into())
}

/// Load an outcome and fail unless it still accepts positions.
pub(super) fn load_open_outcome(conn: &mut SqliteConnection, id: OutcomeId) -> Result<Outcome> {
    let outcome = load_outcome(conn, id)?;
    if !outcome.is_open {
        return Err(LedgerError::OutcomeClosed {
            outcome_id: id.value(),
        }
        .into());
    }
    Ok(outcome)
}
