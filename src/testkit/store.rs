//! Migrated SQLite ledgers for tests.

use std::path::Path;

use crate::adapter::outbound::sqlite::{create_pool, create_pool_with_size, enable_wal, run_migrations, SqliteLedger};
use crate::error::Result;

/// In-memory ledger. The pool holds one connection so every query sees
/// the same database.
///
/// # Errors
/// Returns an error if the pool or migrations fail.
pub fn memory_ledger() -> Result<SqliteLedger> {
    let pool = create_pool_with_size(":memory:", 1)?;
    run_migrations(&pool)?;
    Ok(SqliteLedger::new(pool))
}

/// File-backed ledger in WAL mode, shared across threads.
///
/// # Errors
/// Returns an error if the pool or migrations fail.
pub fn file_ledger(path: &Path) -> Result<SqliteLedger> {
    let pool = create_pool(&path.to_string_lossy())?;
    enable_wal(&pool)?;
    run_migrations(&pool)?;
    Ok(SqliteLedger::new(pool))
}
