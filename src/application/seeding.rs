//! Events and outcomes fed in from the schedule.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::{Event, EventId, NewEvent, NewOutcome, Outcome};
use crate::error::{LedgerError, Result};
use crate::port::outbound::ledger::{LedgerStore, OutcomeStore};
use crate::port::outbound::notifier::{Notification, NotifierRegistry};

use super::resolution::VerifierRegistry;
use super::rejected;

pub struct SeedingService {
    store: Arc<dyn LedgerStore>,
    verifiers: Arc<VerifierRegistry>,
    notifiers: Arc<NotifierRegistry>,
}

impl SeedingService {
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

    /// Record an event, or return the existing one with the same guid.
    pub fn seed_event(&self, event: &NewEvent) -> Result<Event> {
        if let Some(existing) = self.store.event_by_guid(&event.guid)? {
            debug!(guid = %event.guid, event_id = %existing.id, "Event already seeded");
            return Ok(existing);
        }
        let created = self.store.insert_event(event).map_err(rejected("seed_event"))?;
        info!(event_id = %created.id, guid = %created.guid, "Event seeded");
        Ok(created)
    }

    /// Seed an outcome whose display name comes from its verifier.
    ///
    /// # Errors
    /// `Validation` for an unknown type or an empty window, `IncompleteData`
    /// when `data` has no team names.
    pub fn seed_outcome(
        &self,
        event_id: EventId,
        type_id: i32,
        open_date: DateTime<Utc>,
        close_date: DateTime<Utc>,
        data: &Value,
    ) -> Result<Outcome> {
        let name = self
            .verifiers
            .get(type_id)
            .and_then(|verifier| verifier.name(data))
            .map_err(|e| rejected("seed_outcome")(e.into()))?;
        self.create_outcome(&NewOutcome {
            event_id,
            type_id,
            name,
            open_date,
            close_date,
        })
    }

    pub fn create_outcome(&self, outcome: &NewOutcome) -> Result<Outcome> {
        self.insert_outcome(outcome).map_err(rejected("create_outcome"))
    }

    fn insert_outcome(&self, outcome: &NewOutcome) -> Result<Outcome> {
        self.verifiers.get(outcome.type_id)?;
        if outcome.name.trim().is_empty() {
            return Err(LedgerError::validation("name", "must not be blank").into());
        }
        if outcome.open_date >= outcome.close_date {
            return Err(LedgerError::validation("close_date", "must be after open_date").into());
        }

        let created = self.store.insert_outcome(outcome)?;
        info!(
            outcome_id = %created.id,
            event_id = %created.event_id,
            name = %created.name,
            "Outcome added"
        );
        self.notifiers.notify_all(Notification::OutcomeAdded {
            outcome_id: created.id,
            event_id: created.event_id,
            name: created.name.clone(),
        });
        Ok(created)
    }
}
