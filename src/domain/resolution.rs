//! Win/loss polarity applied when an outcome resolves.
//!
//! Offer writers back the "no" side: their collateral pays out when the
//! proposition holds. An offer therefore wins iff the verified proposition
//! is false, and every bid against it takes the opposite side.

use serde::{Deserialize, Serialize};

/// Result recorded on a confirmed offer for a verified proposition.
#[must_use]
pub const fn offer_result(proposition: bool) -> bool {
    !proposition
}

/// Result recorded on a confirmed bid for a verified proposition.
#[must_use]
pub const fn bid_result(proposition: bool) -> bool {
    proposition
}

/// Client-facing view of a record's tri-state result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Standing {
    /// Not yet resolved.
    Pending,
    Lost,
    Won,
}

impl Standing {
    #[must_use]
    pub const fn from_result(result: Option<bool>) -> Self {
        match result {
            None => Self::Pending,
            Some(false) => Self::Lost,
            Some(true) => Self::Won,
        }
    }

    /// Numeric code used by wallet-side contracts polling for settlement.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Lost => 1,
            Self::Won => 2,
        }
    }
}

/// Summary of a resolution pass over one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    /// The verified proposition.
    pub proposition: bool,
    /// True when the outcome had already been resolved and nothing changed.
    pub already_resolved: bool,
    pub offers_marked: usize,
    pub bids_marked: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_and_bid_take_opposite_sides() {
        for proposition in [true, false] {
            assert_ne!(offer_result(proposition), bid_result(proposition));
        }
        assert!(!offer_result(true));
        assert!(bid_result(true));
    }

    #[test]
    fn standing_codes() {
        assert_eq!(Standing::from_result(None).code(), 0);
        assert_eq!(Standing::from_result(Some(false)).code(), 1);
        assert_eq!(Standing::from_result(Some(true)).code(), 2);
    }
}
