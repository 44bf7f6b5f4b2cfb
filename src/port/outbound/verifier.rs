//! Outcome verification port.

use serde_json::Value;

use crate::domain::OutcomeType;
use crate::error::LedgerError;

/// Decides an outcome's proposition from external game data.
///
/// Verifiers are pure: they read `data` and nothing else. Missing fields
/// surface as [`LedgerError::IncompleteData`].
pub trait OutcomeVerifier: Send + Sync {
    /// The outcome type this verifier handles.
    fn outcome_type(&self) -> OutcomeType;

    /// Display name for a new outcome built from `data`.
    fn name(&self, data: &Value) -> Result<String, LedgerError>;

    /// Whether the proposition held.
    fn verify(&self, data: &Value) -> Result<bool, LedgerError>;
}
