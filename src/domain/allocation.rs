//! FIFO allocation of a target bid amount across eligible offers.
//!
//! Offers with identical odds are interchangeable, so the earliest offer is
//! filled first. The planner is pure; the store replays the plan step by
//! step through conditional updates and calls back in here if a step loses
//! a race.

use serde::{Deserialize, Serialize};

use super::id::OfferId;
use super::money::Amount;
use crate::error::LedgerError;

/// Portion of an aggregate bid assigned to one offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub offer_id: OfferId,
    pub amount: Amount,
}

/// An offer eligible for allocation and the coverage it can still take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub offer_id: OfferId,
    pub available: Amount,
}

/// Greedily cover `target` from `candidates` in ascending offer order.
///
/// Candidates with no availability are skipped. Either the returned
/// allocations sum exactly to `target`, or nothing is returned.
///
/// # Errors
/// Returns [`LedgerError::InsufficientCoverage`] when the candidates
/// together cannot cover the target, and [`LedgerError::Validation`] for
/// a non-positive target.
pub fn plan(candidates: &[Candidate], target: Amount) -> Result<Vec<Allocation>, LedgerError> {
    if !target.is_positive() {
        return Err(LedgerError::validation("amount", "must be positive"));
    }

    let mut ordered: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| c.available.is_positive())
        .collect();
    ordered.sort_by_key(|c| c.offer_id);

    // Saturating is exact here: a capped total still covers any target.
    let total = ordered
        .iter()
        .fold(Amount::ZERO, |sum, c| sum.saturating_add(c.available));
    if total < target {
        return Err(LedgerError::InsufficientCoverage {
            requested: target,
            available: total,
        });
    }

    let mut outstanding = target;
    let mut allocations = Vec::new();
    for candidate in ordered {
        if outstanding.is_zero() {
            break;
        }
        let take = outstanding.min(candidate.available);
        allocations.push(Allocation {
            offer_id: candidate.offer_id,
            amount: take,
        });
        outstanding = outstanding.saturating_sub(take);
    }

    debug_assert!(outstanding.is_zero());
    Ok(allocations)
}
