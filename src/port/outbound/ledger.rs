//! Persistence ports for the ledger.
//!
//! Every mutating method is a single transactional boundary: it either
//! commits completely or leaves storage untouched. Races between writers
//! are resolved inside the store with conditional updates, so callers never
//! need a read-modify-write of their own.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    ActivePositions, Allocation, Amount, Bid, BidConfirmation, BidId, CoverageEntry, Escrow,
    EscrowId, Event, EventId, NewBid, NewEscrow, NewEvent, NewOffer, NewOutcome, Odds, Offer,
    OfferId, Outcome, OutcomeFilter, OutcomeId, RecordHash, ResolutionReport, Spread, TxHash,
    UserId, Wallet, WalletId,
};
use crate::error::Result;

/// Aggregate bid request: cover `amount` at `odds` on one outcome.
#[derive(Debug, Clone)]
pub struct AggregateRequest {
    pub user_id: UserId,
    pub outcome_id: OutcomeId,
    pub odds: Odds,
    pub amount: Amount,
}

/// One provisional bid created by an aggregate allocation.
#[derive(Debug, Clone, Serialize)]
pub struct AllocatedBid {
    pub allocation: Allocation,
    pub bid: Bid,
    /// Funding transaction of the offer, so the client can pay against it.
    pub offer_tx_hash: TxHash,
}

/// Records removed by a provisional sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub bids_removed: usize,
    pub offers_removed: usize,
}

/// Everything needed to settle one escrow.
#[derive(Debug, Clone)]
pub struct SettlementContext {
    pub escrow: Escrow,
    pub bid: Bid,
    pub offer: Offer,
}

/// Result of claiming a bid for funding.
#[derive(Debug, Clone, PartialEq)]
pub enum FundingClaim {
    /// The caller holds the claim and may move funds.
    Claimed,
    /// The bid was funded already.
    Funded(Escrow),
}

/// Storage operations for events and outcomes.
pub trait OutcomeStore: Send + Sync {
    /// Insert an event. Fails with `Validation` if the guid is taken.
    fn insert_event(&self, event: &NewEvent) -> Result<Event>;

    fn event(&self, id: EventId) -> Result<Option<Event>>;

    fn event_by_guid(&self, guid: &str) -> Result<Option<Event>>;

    /// Insert an open outcome under an existing event.
    fn insert_outcome(&self, outcome: &NewOutcome) -> Result<Outcome>;

    fn outcome(&self, id: OutcomeId) -> Result<Option<Outcome>>;

    fn outcomes_for_event(&self, id: EventId) -> Result<Vec<Outcome>>;

    /// Outcomes matching the filter, ordered by close date.
    fn list_outcomes(&self, filter: &OutcomeFilter) -> Result<Vec<Outcome>>;

    /// Close every open outcome whose close date is before `now`.
    ///
    /// Returns the number of outcomes closed.
    fn expire_outcomes(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Record a verified proposition and mark confirmed offers and bids.
    ///
    /// A no-op if the outcome already carries a result.
    fn resolve_outcome(&self, id: OutcomeId, proposition: bool) -> Result<ResolutionReport>;

    /// The outcome, its event, and its confirmed offers and bids.
    fn spread(&self, id: OutcomeId) -> Result<Option<Spread>>;
}

/// Storage operations for offers, bids, and coverage.
pub trait PositionStore: Send + Sync {
    /// Insert a provisional offer on an open outcome.
    fn insert_offer(&self, offer: &NewOffer) -> Result<Offer>;

    fn offer(&self, id: OfferId) -> Result<Option<Offer>>;

    fn offer_by_hash(&self, hash: &RecordHash) -> Result<Option<Offer>>;

    fn bid(&self, id: BidId) -> Result<Option<Bid>>;

    fn bid_by_hash(&self, hash: &RecordHash) -> Result<Option<Bid>>;

    fn bids_for_offer(&self, id: OfferId) -> Result<Vec<Bid>>;

    /// Insert a provisional bid and hold its value on the offer.
    ///
    /// The offer must be confirmed with enough unconsumed coverage, and its
    /// outcome must be open.
    fn place_bid(&self, bid: &NewBid) -> Result<Bid>;

    /// Spread an aggregate bid over matching offers, oldest first.
    ///
    /// Either the full amount is allocated or nothing persists.
    fn allocate(&self, request: &AggregateRequest) -> Result<Vec<AllocatedBid>>;

    /// Reserve `amount` of an offer's unconsumed coverage.
    fn hold_coverage(&self, offer_id: OfferId, amount: Amount) -> Result<Offer>;

    /// Consume `amount` of an offer's coverage on behalf of `bid_id`, which
    /// must be a confirmed bid on the offer with exactly that value. Each bid
    /// is journaled at most once.
    fn decrement_coverage(&self, offer_id: OfferId, bid_id: BidId, amount: Amount) -> Result<Offer>;

    /// Journal of decrements applied to an offer, oldest first.
    fn coverage_entries(&self, offer_id: OfferId) -> Result<Vec<CoverageEntry>>;

    /// Bind the funding transaction to a provisional offer.
    fn confirm_offer(&self, hash: &RecordHash, tx_hash: &TxHash, caller: UserId) -> Result<Offer>;

    /// Confirm a batch of bids. One failure rolls back the whole batch.
    fn confirm_bids(&self, items: &[BidConfirmation], caller: UserId) -> Result<Vec<Bid>>;

    /// Delete provisional records created before `cutoff`.
    fn prune_provisional(&self, cutoff: DateTime<Utc>) -> Result<PruneReport>;

    /// Confirmed offers and bids of `user` on open outcomes.
    fn active_positions(&self, user: UserId) -> Result<ActivePositions>;
}

/// Storage operations for wallets and escrows.
pub trait EscrowStore: Send + Sync {
    /// Register a payout address. Addresses are unique across users.
    fn insert_wallet(&self, user: UserId, address: &str) -> Result<Wallet>;

    fn wallet(&self, id: WalletId) -> Result<Option<Wallet>>;

    /// Most recently registered wallet of `user`.
    fn wallet_for_user(&self, user: UserId) -> Result<Option<Wallet>>;

    /// Take the funding claim on a confirmed bid before any funds move.
    ///
    /// Fails with `TransferInFlight` while another caller holds it.
    fn claim_funding(&self, bid_id: BidId, claim: &str) -> Result<FundingClaim>;

    /// Drop a funding claim after a failed transfer. No-op for other claims.
    fn release_funding_claim(&self, bid_id: BidId, claim: &str) -> Result<()>;

    /// Record a funded escrow and clear the bid's funding claim.
    /// Re-recording an incoming hash returns the existing escrow; a bid
    /// holds at most one escrow.
    fn record_escrow(&self, escrow: &NewEscrow) -> Result<Escrow>;

    fn escrow(&self, id: EscrowId) -> Result<Option<Escrow>>;

    fn escrows_for_bid(&self, bid_id: BidId) -> Result<Vec<Escrow>>;

    /// Load an escrow with its bid and offer.
    fn settlement_context(&self, id: EscrowId) -> Result<SettlementContext>;

    /// Take the payout claim on an active escrow before any funds move.
    ///
    /// Fails with `EscrowInactive` once paid and `TransferInFlight` while
    /// another caller holds the claim.
    fn claim_payout(&self, id: EscrowId, claim: &str) -> Result<()>;

    /// Drop a payout claim after a failed transfer. No-op for other claims.
    fn release_payout_claim(&self, id: EscrowId, claim: &str) -> Result<()>;

    /// Deactivate an escrow under `tx_hash` and mark its bid paid.
    ///
    /// Repeating with the same hash returns the settled escrow unchanged.
    fn complete_payout(&self, id: EscrowId, tx_hash: &TxHash, at: DateTime<Utc>) -> Result<Escrow>;
}

/// The full ledger store.
pub trait LedgerStore: OutcomeStore + PositionStore + EscrowStore {}

impl<T: OutcomeStore + PositionStore + EscrowStore> LedgerStore for T {}
