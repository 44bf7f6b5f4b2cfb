use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::money::Amount;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Broad classification of ledger failures.
///
/// Callers use this to decide whether to re-fetch, retry, or give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing request fields. Nothing was mutated.
    Validation,
    /// Replay or duplicate. Existing state is unchanged.
    Conflict,
    /// Caller does not own the record.
    Authorization,
    /// Not enough coverage. The attempted allocation was rolled back.
    Capacity,
    /// Stale client view of an entity's lifecycle.
    State,
    /// An external collaborator failed. Safe to retry.
    External,
}

/// Errors raised by ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("outcome data incomplete: missing {field}")]
    IncompleteData { field: &'static str },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} already confirmed")]
    AlreadyConfirmed { entity: &'static str },

    #[error("duplicate {entity} hash")]
    DuplicateHash { entity: &'static str },

    #[error("escrow {escrow_id} already paid out under a different transaction")]
    PayoutConflict { escrow_id: i32 },

    #[error("bid {bid_id} is already funded")]
    AlreadyFunded { bid_id: i32 },

    #[error("{entity} {id} has a transfer in flight")]
    TransferInFlight { entity: &'static str, id: i32 },

    #[error("caller does not own this {entity}")]
    NotOwner { entity: &'static str },

    #[error("insufficient coverage: requested {requested}, available {available}")]
    InsufficientCoverage { requested: Amount, available: Amount },

    #[error("outcome {outcome_id} is closed")]
    OutcomeClosed { outcome_id: i32 },

    #[error("offer {offer_id} is not confirmed")]
    OfferNotConfirmed { offer_id: i32 },

    #[error("bid {bid_id} is not confirmed")]
    BidNotConfirmed { bid_id: i32 },

    #[error("bid {bid_id} has not been resolved")]
    BidUnresolved { bid_id: i32 },

    #[error("escrow {escrow_id} is no longer active")]
    EscrowInactive { escrow_id: i32 },

    #[error("payout failed: {reason}")]
    PayoutFailed { reason: String },
}

impl LedgerError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::IncompleteData { .. } => ErrorKind::Validation,
            Self::AlreadyConfirmed { .. }
            | Self::DuplicateHash { .. }
            | Self::PayoutConflict { .. }
            | Self::AlreadyFunded { .. }
            | Self::TransferInFlight { .. } => ErrorKind::Conflict,
            Self::NotOwner { .. } => ErrorKind::Authorization,
            Self::InsufficientCoverage { .. } => ErrorKind::Capacity,
            Self::NotFound { .. }
            | Self::OutcomeClosed { .. }
            | Self::OfferNotConfirmed { .. }
            | Self::BidNotConfirmed { .. }
            | Self::BidUnresolved { .. }
            | Self::EscrowInactive { .. } => ErrorKind::State,
            Self::PayoutFailed { .. } => ErrorKind::External,
        }
    }

    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),
}

impl Error {
    /// Ledger classification, if this is a ledger or domain error.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Ledger(e) => Some(e.kind()),
            Self::Domain(_) => Some(ErrorKind::Validation),
            _ => None,
        }
    }

    /// True for failures an external scheduler may retry unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Ledger(e) => e.kind() == ErrorKind::External,
            Self::Http(_) | Self::Connection(_) => true,
            _ => false,
        }
    }

    /// Borrow the inner ledger error, if any.
    #[must_use]
    pub fn as_ledger(&self) -> Option<&LedgerError> {
        match self {
            Self::Ledger(e) => Some(e),
            _ => None,
        }
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_classifies_variants() {
        assert_eq!(
            LedgerError::validation("odds", "must be positive").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LedgerError::AlreadyConfirmed { entity: "bid" }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            LedgerError::TransferInFlight { entity: "escrow", id: 4 }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            LedgerError::NotOwner { entity: "offer" }.kind(),
            ErrorKind::Authorization
        );
        assert_eq!(
            LedgerError::InsufficientCoverage {
                requested: Amount::from_minor(5),
                available: Amount::from_minor(1),
            }
            .kind(),
            ErrorKind::Capacity
        );
        assert_eq!(
            LedgerError::OutcomeClosed { outcome_id: 1 }.kind(),
            ErrorKind::State
        );
        assert_eq!(
            LedgerError::PayoutFailed {
                reason: "timeout".into()
            }
            .kind(),
            ErrorKind::External
        );
    }

    #[test]
    fn only_external_failures_are_retryable() {
        let payout: Error = LedgerError::PayoutFailed {
            reason: "no hash".into(),
        }
        .into();
        assert!(payout.is_retryable());

        let closed: Error = LedgerError::OutcomeClosed { outcome_id: 3 }.into();
        assert!(!closed.is_retryable());
        assert_eq!(closed.kind(), Some(ErrorKind::State));
    }
}
