//! Escrow holdings and settlement arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{BidId, EscrowId, OfferId, TxHash, UserId, WalletId};
use super::money::{Amount, CommissionRate, Odds};

/// Funds held in custody for one bid between funding and payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escrow {
    pub id: EscrowId,
    pub offer_id: OfferId,
    pub bid_id: BidId,
    /// Wallet the bidder funded the escrow from.
    pub wallet_id: WalletId,
    pub commission: Amount,
    pub value: Amount,
    /// True while funds are held. Flips to false once, at payout.
    pub active: bool,
    pub incoming_hash: TxHash,
    pub payout_hash: Option<TxHash>,
    pub payout_date: Option<DateTime<Utc>>,
}

impl Escrow {
    /// Original bid value: net value plus commission.
    #[must_use]
    pub fn gross(&self) -> Amount {
        self.value.saturating_add(self.commission)
    }
}

/// Fields needed to record a funded escrow.
#[derive(Debug, Clone)]
pub struct NewEscrow {
    pub offer_id: OfferId,
    pub bid_id: BidId,
    pub wallet_id: WalletId,
    pub split: EscrowSplit,
    pub incoming_hash: TxHash,
}

/// Division of a bid's value into house commission and held value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowSplit {
    pub commission: Amount,
    pub value: Amount,
}

impl EscrowSplit {
    /// Split `gross` so that `commission + value == gross` exactly.
    ///
    /// Commission is rounded down; the remainder stays with the value.
    ///
    /// # Errors
    /// Returns [`DomainError::Overflow`] if the product does not fit.
    pub fn compute(gross: Amount, rate: CommissionRate) -> Result<Self, DomainError> {
        let commission = gross.mul_floor(rate.as_decimal())?;
        let value = gross.checked_sub(commission).ok_or(DomainError::Overflow)?;
        Ok(Self { commission, value })
    }
}

/// Which party an escrow pays out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutParty {
    /// The bid owner, when the bid won.
    Bidder,
    /// The offer owner, when the bid lost.
    OfferWriter,
}

/// Computed payout for a resolved bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub party: PayoutParty,
    pub recipient: UserId,
    pub amount: Amount,
}

impl Payout {
    /// Payout for a bid of `value` at `odds`.
    ///
    /// A winning bid receives `value × odds × (1 − rate)`; a losing bid's
    /// `value × (1 − rate)` goes to the offer writer. Both are rounded down
    /// to a whole minor unit.
    ///
    /// # Errors
    /// Returns [`DomainError::Overflow`] if the product does not fit.
    pub fn compute(
        value: Amount,
        odds: Odds,
        rate: CommissionRate,
        bid_won: bool,
        bidder: UserId,
        offer_writer: UserId,
    ) -> Result<Self, DomainError> {
        if bid_won {
            let factor = odds
                .as_decimal()
                .checked_mul(rate.retained())
                .ok_or(DomainError::Overflow)?;
            Ok(Self {
                party: PayoutParty::Bidder,
                recipient: bidder,
                amount: value.mul_floor(factor)?,
            })
        } else {
            Ok(Self {
                party: PayoutParty::OfferWriter,
                recipient: offer_writer,
                amount: value.mul_floor(rate.retained())?,
            })
        }
    }
}
