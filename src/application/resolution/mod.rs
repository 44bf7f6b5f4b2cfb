//! Outcome resolution from verified game data.

mod registry;

pub use registry::VerifierRegistry;

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::domain::{EventId, OutcomeId, ResolutionReport};
use crate::error::{LedgerError, Result};
use crate::port::outbound::ledger::{LedgerStore, OutcomeStore};
use crate::port::outbound::notifier::{Notification, NotifierRegistry};

use super::rejected;

/// Resolves outcomes and marks the records riding on them.
pub struct ResolutionService {
    store: Arc<dyn LedgerStore>,
    verifiers: Arc<VerifierRegistry>,
    notifiers: Arc<NotifierRegistry>,
}

impl ResolutionService {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        verifiers: Arc<VerifierRegistry>,
        notifiers: Arc<NotifierRegistry>,
    ) -> Self {
        Self {
            store,
            verifiers,
            notifiers,
        }
    }

    /// Verify `data` against an outcome and record the result.
    ///
    /// Already-resolved outcomes are returned unchanged without consulting
    /// the verifier. Outcomes closed by expiry are still resolvable.
    ///
    /// # Errors
    /// `NotFound`, `Validation` for an unknown type, `IncompleteData` when
    /// `data` lacks a field the verifier needs. Nothing is mutated on error.
    pub fn resolve(&self, outcome_id: OutcomeId, data: &Value) -> Result<ResolutionReport> {
        self.resolve_inner(outcome_id, data)
            .map_err(rejected("resolve_outcome"))
    }

    /// Resolve every outcome of an event from the same game data.
    ///
    /// Stops at the first failing outcome; outcomes resolved before it stay
    /// resolved.
    ///
    /// # Errors
    /// `NotFound` for the event, or the first outcome's failure.
    pub fn resolve_event(&self, event_id: EventId, data: &Value) -> Result<Vec<(OutcomeId, ResolutionReport)>> {
        if self.store.event(event_id)?.is_none() {
            return Err(LedgerError::not_found("event", event_id).into());
        }
        self.store
            .outcomes_for_event(event_id)?
            .into_iter()
            .map(|outcome| Ok((outcome.id, self.resolve(outcome.id, data)?)))
            .collect()
    }

    fn resolve_inner(&self, outcome_id: OutcomeId, data: &Value) -> Result<ResolutionReport> {
        let outcome = self
            .store
            .outcome(outcome_id)?
            .ok_or_else(|| LedgerError::not_found("outcome", outcome_id))?;

        if let Some(proposition) = outcome.result {
            return Ok(ResolutionReport {
                proposition,
                already_resolved: true,
                offers_marked: 0,
                bids_marked: 0,
            });
        }

        let proposition = self.verifiers.get(outcome.type_id)?.verify(data)?;
        let report = self.store.resolve_outcome(outcome_id, proposition)?;

        if !report.already_resolved {
            info!(
                %outcome_id,
                proposition,
                offers = report.offers_marked,
                bids = report.bids_marked,
                "Outcome resolved"
            );
            self.notifiers.notify_all(Notification::OutcomeResolved {
                outcome_id,
                proposition,
            });
        }
        Ok(report)
    }
}
