//! Housekeeping passes invoked by an external scheduler.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::error::Result;
use crate::port::outbound::ledger::{LedgerStore, OutcomeStore, PositionStore, PruneReport};

/// Closes expired outcomes and reclaims stale provisional records.
pub struct Maintenance {
    store: Arc<dyn LedgerStore>,
    retention: Duration,
}

impl Maintenance {
    /// `retention` is how long a provisional record may wait for its
    /// funding transaction before it is pruned.
    pub fn new(store: Arc<dyn LedgerStore>, retention: Duration) -> Self {
        Self { store, retention }
    }

    /// Close every open outcome whose close date is before `now`.
    ///
    /// Returns the number of outcomes closed.
    pub fn expire_outcomes(&self, now: DateTime<Utc>) -> Result<usize> {
        let closed = self.store.expire_outcomes(now)?;
        if closed > 0 {
            info!(closed, %now, "Outcomes expired");
        }
        Ok(closed)
    }

    /// Delete provisional records created more than the retention window
    /// before `now`.
    pub fn prune_provisional(&self, now: DateTime<Utc>) -> Result<PruneReport> {
        let cutoff = now - self.retention;
        let report = self.store.prune_provisional(cutoff)?;
        info!(
            %cutoff,
            bids = report.bids_removed,
            offers = report.offers_removed,
            "Provisional records pruned"
        );
        Ok(report)
    }
}
