//! Offers: collateral backing the "no" side of an outcome at fixed odds.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{OfferId, OutcomeId, RecordHash, TxHash, UserId};
use super::money::{Amount, Odds};
use super::resolution::Standing;

/// A collateral commitment against one outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub user_id: UserId,
    pub outcome_id: OutcomeId,
    pub odds: Odds,
    /// Initial collateral. Immutable.
    pub coverage: Amount,
    /// `coverage` minus the value of every confirmed bid.
    pub remaining_coverage: Amount,
    /// Value of provisional bids placed against this offer.
    pub held_coverage: Amount,
    pub hash: RecordHash,
    /// Present once the funding transaction has been observed.
    pub tx_hash: Option<TxHash>,
    /// `None` until resolved; otherwise whether the offer won.
    pub result: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        self.tx_hash.is_some()
    }

    /// Coverage not yet consumed or held by a provisional bid.
    #[must_use]
    pub fn available_coverage(&self) -> Amount {
        self.remaining_coverage.saturating_sub(self.held_coverage)
    }

    /// Total coverage consumed by confirmed bids.
    #[must_use]
    pub fn consumed_coverage(&self) -> Amount {
        self.coverage.saturating_sub(self.remaining_coverage)
    }

    /// Largest stake a bidder can place so that the offer still covers the
    /// payout at these odds. Rounded down to a whole minor unit.
    #[must_use]
    pub fn max_bid(&self) -> Amount {
        let max = Decimal::from(self.remaining_coverage.minor()) / self.odds.as_decimal();
        Amount::from_minor(max.trunc().to_i64().unwrap_or_default())
    }

    #[must_use]
    pub fn standing(&self) -> Standing {
        Standing::from_result(self.result)
    }
}

/// Fields needed to record a provisional offer.
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub user_id: UserId,
    pub outcome_id: OutcomeId,
    pub odds: Odds,
    pub coverage: Amount,
    pub hash: RecordHash,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn offer(remaining: i64, held: i64) -> Offer {
        Offer {
            id: OfferId::new(1),
            user_id: UserId::new(1),
            outcome_id: OutcomeId::new(1),
            odds: Odds::try_new(dec!(2.5)).unwrap(),
            coverage: Amount::from_minor(1_000),
            remaining_coverage: Amount::from_minor(remaining),
            held_coverage: Amount::from_minor(held),
            hash: RecordHash::from("h"),
            tx_hash: None,
            result: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn available_excludes_holds() {
        assert_eq!(offer(600, 200).available_coverage(), Amount::from_minor(400));
        assert_eq!(offer(100, 200).available_coverage(), Amount::ZERO);
    }

    #[test]
    fn consumed_is_coverage_minus_remaining() {
        assert_eq!(offer(600, 0).consumed_coverage(), Amount::from_minor(400));
    }

    #[test]
    fn max_bid_divides_by_odds() {
        assert_eq!(offer(1_000, 0).max_bid(), Amount::from_minor(400));
        assert_eq!(offer(999, 0).max_bid(), Amount::from_minor(399));
    }
}
