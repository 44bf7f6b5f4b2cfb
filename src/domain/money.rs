//! Monetary types: scaled-integer amounts, fixed-precision odds, and
//! commission rates.
//!
//! All ledger arithmetic happens on [`Amount`], an integer count of minor
//! units. Fractional products (commission, payouts) go through
//! [`Decimal`] and are rounded down to a whole minor unit.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Number of fractional digits in one major unit.
pub const MINOR_UNIT_SCALE: u32 = 8;

/// Minor units per major unit.
pub const MINOR_UNITS_PER_MAJOR: i64 = 100_000_000;

/// Largest odds multiplier accepted (four digits, two fractional).
const MAX_ODDS_HUNDREDTHS: i64 = 9_999;

/// A monetary amount stored as an integer number of minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Build an amount from a raw minor-unit count.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Parse a major-unit decimal, rejecting sub-minor precision.
    ///
    /// # Errors
    /// Returns an error when the value has more than eight fractional digits
    /// or does not fit in an `i64` of minor units.
    pub fn try_from_major(major: Decimal) -> Result<Self, DomainError> {
        let scaled = major
            .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
            .ok_or(DomainError::AmountOutOfRange { amount: major })?;
        if scaled.fract() != Decimal::ZERO {
            return Err(DomainError::SubMinorPrecision { amount: major });
        }
        scaled
            .to_i64()
            .map(Self)
            .ok_or(DomainError::AmountOutOfRange { amount: major })
    }

    /// Parse a strictly positive major-unit decimal.
    ///
    /// # Errors
    /// Returns an error for zero, negative, or over-precise values.
    pub fn try_positive(major: Decimal) -> Result<Self, DomainError> {
        let amount = Self::try_from_major(major)?;
        if amount.is_positive() {
            Ok(amount)
        } else {
            Err(DomainError::NonPositiveAmount { amount: major })
        }
    }

    /// Raw minor-unit count.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Value in major units.
    #[must_use]
    pub fn to_major(self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE).normalize()
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtract, flooring at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0).max(0))
    }

    /// Total of `amounts`, or `None` if it does not fit.
    pub fn checked_sum<I: IntoIterator<Item = Self>>(amounts: I) -> Option<Self> {
        amounts.into_iter().try_fold(Self::ZERO, Self::checked_add)
    }

    /// Multiply by a decimal factor, rounding down to a whole minor unit.
    ///
    /// # Errors
    /// Returns [`DomainError::Overflow`] if the product does not fit.
    pub fn mul_floor(self, factor: Decimal) -> Result<Self, DomainError> {
        Decimal::from(self.0)
            .checked_mul(factor)
            .map(|p| p.round_dp_with_strategy(0, RoundingStrategy::ToZero))
            .and_then(|p| p.to_i64())
            .map(Self)
            .ok_or(DomainError::Overflow)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_major())
    }
}

/// A fixed odds multiplier asserted by the offer creator.
///
/// Held as an integer number of hundredths so that equality is exact when
/// matching bids to offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Odds(i64);

impl Odds {
    /// Validate a decimal multiplier.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidOdds`] for non-positive values, more
    /// than two decimal places, or values of 100 or more.
    pub fn try_new(odds: Decimal) -> Result<Self, DomainError> {
        if odds <= Decimal::ZERO {
            return Err(DomainError::InvalidOdds {
                odds,
                reason: "must be positive",
            });
        }
        let hundredths = odds * Decimal::ONE_HUNDRED;
        if hundredths.fract() != Decimal::ZERO {
            return Err(DomainError::InvalidOdds {
                odds,
                reason: "at most two decimal places",
            });
        }
        match hundredths.to_i64() {
            Some(h) if h <= MAX_ODDS_HUNDREDTHS => Ok(Self(h)),
            _ => Err(DomainError::InvalidOdds {
                odds,
                reason: "must be below 100",
            }),
        }
    }

    /// Rebuild from the stored hundredths representation.
    #[must_use]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn as_decimal(self) -> Decimal {
        Decimal::new(self.0, 2).normalize()
    }
}

impl TryFrom<Decimal> for Odds {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Odds> for Decimal {
    fn from(odds: Odds) -> Self {
        odds.as_decimal()
    }
}

impl fmt::Display for Odds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_decimal())
    }
}

/// Share of a bid's value retained by the house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct CommissionRate(Decimal);

impl CommissionRate {
    /// Validate a rate in `[0, 1)`.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidCommissionRate`] outside that range.
    pub fn try_new(rate: Decimal) -> Result<Self, DomainError> {
        if rate < Decimal::ZERO || rate >= Decimal::ONE {
            return Err(DomainError::InvalidCommissionRate { rate });
        }
        Ok(Self(rate))
    }

    #[must_use]
    pub const fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Fraction of value passed on after commission.
    #[must_use]
    pub fn retained(self) -> Decimal {
        Decimal::ONE - self.0
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        Self(Decimal::new(5, 2))
    }
}

impl TryFrom<Decimal> for CommissionRate {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<CommissionRate> for Decimal {
    fn from(rate: CommissionRate) -> Self {
        rate.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amount_round_trips_major_units() {
        let amount = Amount::try_from_major(dec!(1.5)).unwrap();
        assert_eq!(amount.minor(), 150_000_000);
        assert_eq!(amount.to_major(), dec!(1.5));
        assert_eq!(amount.to_string(), "1.5");
    }

    #[test]
    fn amount_rejects_sub_minor_precision() {
        let result = Amount::try_from_major(dec!(0.000000001));
        assert!(matches!(result, Err(DomainError::SubMinorPrecision { .. })));
    }

    #[test]
    fn positive_amount_rejects_zero() {
        assert!(matches!(
            Amount::try_positive(Decimal::ZERO),
            Err(DomainError::NonPositiveAmount { .. })
        ));
    }

    #[test]
    fn mul_floor_truncates_fractional_minor_units() {
        let amount = Amount::from_minor(7);
        assert_eq!(amount.mul_floor(dec!(0.5)).unwrap(), Amount::from_minor(3));
    }

    #[test]
    fn arithmetic_at_the_edges_does_not_wrap() {
        let max = Amount::from_minor(i64::MAX);
        let min = Amount::from_minor(i64::MIN);
        assert_eq!(max.saturating_add(Amount::from_minor(1)), max);
        assert_eq!(Amount::from_minor(5).saturating_sub(max), Amount::ZERO);
        assert_eq!(max.saturating_sub(min), max);

        let half = Amount::from_minor(i64::MAX / 2 + 1);
        assert_eq!(Amount::checked_sum([half, half]), None);
        assert_eq!(
            Amount::checked_sum([Amount::from_minor(2), Amount::from_minor(3)]),
            Some(Amount::from_minor(5))
        );
        assert_eq!(Amount::checked_sum([]), Some(Amount::ZERO));
    }

    #[test]
    fn odds_require_two_decimal_places() {
        assert_eq!(Odds::try_new(dec!(2.5)).unwrap().hundredths(), 250);
        assert!(Odds::try_new(dec!(2.505)).is_err());
        assert!(Odds::try_new(dec!(-1)).is_err());
        assert!(Odds::try_new(dec!(100)).is_err());
        assert_eq!(Odds::from_hundredths(250).as_decimal(), dec!(2.5));
    }

    #[test]
    fn odds_deserialize_through_validation() {
        let odds: Odds = serde_json::from_str("\"1.75\"").unwrap();
        assert_eq!(odds.hundredths(), 175);
        assert!(serde_json::from_str::<Odds>("\"0\"").is_err());
    }

    #[test]
    fn commission_rate_bounds() {
        assert!(CommissionRate::try_new(dec!(0)).is_ok());
        assert!(CommissionRate::try_new(dec!(1)).is_err());
        assert_eq!(CommissionRate::default().retained(), dec!(0.95));
    }
}
