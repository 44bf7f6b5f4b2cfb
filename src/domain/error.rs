//! Domain validation errors for core value types.
//!
//! These errors are returned by `try_from_*` constructors that validate
//! monetary inputs before they reach the ledger.
//!
//! # Examples
//!
//! ```
//! use stakebook::domain::error::DomainError;
//! use stakebook::domain::money::Odds;
//! use rust_decimal_macros::dec;
//!
//! let result = Odds::try_new(dec!(0));
//! assert!(matches!(result, Err(DomainError::InvalidOdds { .. })));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Amounts used for coverage, bids, and transfers must be positive.
    #[error("amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// The invalid amount that was provided.
        amount: Decimal,
    },

    /// Amounts cannot be more precise than one minor unit.
    #[error("amount {amount} is finer than one minor unit")]
    SubMinorPrecision {
        /// The over-precise amount.
        amount: Decimal,
    },

    /// Amount does not fit the scaled-integer representation.
    #[error("amount {amount} is out of range")]
    AmountOutOfRange {
        /// The oversized amount.
        amount: Decimal,
    },

    /// Odds must be positive, at most two decimal places, below 100.
    #[error("invalid odds {odds}: {reason}")]
    InvalidOdds {
        /// The rejected odds.
        odds: Decimal,
        /// Why the odds were rejected.
        reason: &'static str,
    },

    /// Commission rate must lie in `[0, 1)`.
    #[error("commission rate must be in [0, 1), got {rate}")]
    InvalidCommissionRate {
        /// The rejected rate.
        rate: Decimal,
    },

    /// Arithmetic on amounts overflowed.
    #[error("amount arithmetic overflowed")]
    Overflow,
}
