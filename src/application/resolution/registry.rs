//! Verifier lookup by outcome type.

use std::collections::HashMap;

use crate::adapter::outbound::verifier::{GameWinVerifier, NoRunsVerifier, Side};
use crate::domain::OutcomeType;
use crate::error::LedgerError;
use crate::port::outbound::verifier::OutcomeVerifier;

/// Registry of outcome verifiers, one per [`OutcomeType`].
///
/// [`VerifierRegistry::baseball`] registers the built-in verifiers. Tests
/// and embedders can start from [`VerifierRegistry::new`] and register
/// their own.
#[derive(Default)]
pub struct VerifierRegistry {
    verifiers: HashMap<OutcomeType, Box<dyn OutcomeVerifier>>,
}

impl VerifierRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the four baseball propositions.
    #[must_use]
    pub fn baseball() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(NoRunsVerifier::new(Side::Home)));
        registry.register(Box::new(NoRunsVerifier::new(Side::Away)));
        registry.register(Box::new(GameWinVerifier::new(Side::Home)));
        registry.register(Box::new(GameWinVerifier::new(Side::Away)));
        registry
    }

    /// Register a verifier, replacing any previous one for its type.
    pub fn register(&mut self, verifier: Box<dyn OutcomeVerifier>) {
        self.verifiers.insert(verifier.outcome_type(), verifier);
    }

    /// Verifier for a stored `type_id`.
    ///
    /// # Errors
    /// `Validation` for an unknown type or one with no verifier.
    pub fn get(&self, type_id: i32) -> Result<&dyn OutcomeVerifier, LedgerError> {
        let outcome_type = OutcomeType::try_from(type_id)?;
        self.verifiers
            .get(&outcome_type)
            .map(AsRef::as_ref)
            .ok_or_else(|| LedgerError::validation("type_id", format!("no verifier for {outcome_type:?}")))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.verifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verifiers.is_empty()
    }
}
