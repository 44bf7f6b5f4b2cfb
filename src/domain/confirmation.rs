//! Guards for the provisional → confirmed transition.
//!
//! A record becomes confirmed exactly once, by its owner, when the external
//! transaction that funds it is observed. Checks run in a fixed order so a
//! non-owner learns nothing beyond whether the hash exists.

use super::bid::Bid;
use super::id::{RecordHash, TxHash, UserId};
use super::offer::Offer;
use crate::error::LedgerError;

/// A record that follows the two-phase confirmation protocol.
pub trait Confirmable {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    fn owner(&self) -> UserId;

    fn tx_hash(&self) -> Option<&TxHash>;
}

impl Confirmable for Offer {
    const ENTITY: &'static str = "offer";

    fn owner(&self) -> UserId {
        self.user_id
    }

    fn tx_hash(&self) -> Option<&TxHash> {
        self.tx_hash.as_ref()
    }
}

impl Confirmable for Bid {
    const ENTITY: &'static str = "bid";

    fn owner(&self) -> UserId {
        self.user_id
    }

    fn tx_hash(&self) -> Option<&TxHash> {
        self.tx_hash.as_ref()
    }
}

/// Reject malformed transaction hashes before touching storage.
///
/// # Errors
/// Returns [`LedgerError::Validation`] for a blank hash.
pub fn validate_tx_hash(tx_hash: &TxHash) -> Result<(), LedgerError> {
    if tx_hash.is_blank() {
        return Err(LedgerError::validation("tx_hash", "must not be blank"));
    }
    Ok(())
}

/// Check that `record` (looked up by `hash`) may be confirmed by `caller`.
///
/// # Errors
/// `NotFound` if there is no record, `AlreadyConfirmed` if a transaction
/// hash is already bound, `NotOwner` if the caller is someone else.
pub fn ensure_confirmable<'a, R: Confirmable>(
    record: Option<&'a R>,
    hash: &RecordHash,
    caller: UserId,
) -> Result<&'a R, LedgerError> {
    let record = record.ok_or_else(|| LedgerError::not_found(R::ENTITY, hash))?;
    if record.tx_hash().is_some() {
        return Err(LedgerError::AlreadyConfirmed { entity: R::ENTITY });
    }
    if record.owner() != caller {
        return Err(LedgerError::NotOwner { entity: R::ENTITY });
    }
    Ok(record)
}
