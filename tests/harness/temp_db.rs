use std::path::PathBuf;
use std::sync::Arc;

use stakebook::adapter::outbound::sqlite::SqliteLedger;
use stakebook::testkit::store::file_ledger;
use tempfile::TempDir;

/// Temporary file-backed SQLite ledger in WAL mode.
///
/// Unlike the in-memory ledger, several pooled connections see the same
/// database, so this is what concurrency tests run against.
pub struct TempDb {
    _dir: TempDir,
    path: PathBuf,
    ledger: Arc<SqliteLedger>,
}

impl TempDb {
    pub fn create(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(format!("stakebook-{name}.db"));
        let ledger = file_ledger(&path).expect("open temp ledger");
        Self {
            _dir: dir,
            path,
            ledger: Arc::new(ledger),
        }
    }

    pub fn ledger(&self) -> Arc<SqliteLedger> {
        Arc::clone(&self.ledger)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
