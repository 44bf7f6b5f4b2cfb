//! SQLite persistence adapter.
//!
//! Provides the SQLite-backed ledger store using Diesel ORM. The store is
//! split by port: outcomes, positions, and escrows each get their own
//! module, all implemented on [`SqliteLedger`].

pub mod database;
mod escrow;
mod ledger;
mod outcome;
mod position;

pub use database::connection::{create_pool, create_pool_with_size, enable_wal, run_migrations, DbPool};
pub use ledger::SqliteLedger;
