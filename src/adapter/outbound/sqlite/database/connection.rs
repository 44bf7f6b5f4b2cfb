//! Database connection management using Diesel ORM.
//!
//! Provides connection pooling, migration support, and per-connection
//! pragmas for SQLite databases.

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{Error, Result};

/// Embedded database migrations compiled from the migrations/ directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Milliseconds a writer waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Applies [`configure_sqlite_connection`] to every pooled connection.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&pragma_sql())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

fn pragma_sql() -> String {
    format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}; PRAGMA foreign_keys = ON;")
}

/// Create a connection pool for the given database URL.
///
/// # Errors
/// Returns an error if the pool cannot be created.
pub fn create_pool(database_url: &str) -> Result<DbPool> {
    create_pool_with_size(database_url, 5)
}

/// Create a pool holding at most `max_size` connections.
///
/// In-memory databases are private to one connection, so they need a
/// pool of one.
///
/// # Errors
/// Returns an error if the pool cannot be created.
pub fn create_pool_with_size(database_url: &str, max_size: u32) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .map_err(|e| Error::Connection(e.to_string()))
}

/// Run all pending database migrations.
///
/// # Errors
/// Returns an error if migrations fail.
pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool.get().map_err(|e| Error::Connection(e.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| Error::Connection(e.to_string()))?;
    Ok(())
}

/// Switch a file database to write-ahead logging.
///
/// The journal mode is persistent, so this only needs to run once per file.
///
/// # Errors
/// Returns an error if the pragma fails to apply.
pub fn enable_wal(pool: &DbPool) -> Result<()> {
    let mut conn = pool.get().map_err(|e| Error::Connection(e.to_string()))?;
    conn.batch_execute("PRAGMA journal_mode = WAL;")
        .map_err(|e| Error::Database(e.to_string()))
}

/// Apply the busy timeout and foreign key enforcement to one connection.
///
/// Pooled connections get this automatically; use it for connections
/// established by hand.
///
/// # Errors
/// Returns an error if a pragma fails to apply.
pub fn configure_sqlite_connection(conn: &mut SqliteConnection) -> Result<()> {
    conn.batch_execute(&pragma_sql())
        .map_err(|e| Error::Database(e.to_string()))
}
