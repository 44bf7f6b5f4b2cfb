//! Ledger domain: entities, value types, and the pure rules that the
//! store and services apply.

pub mod allocation;
pub mod bid;
pub mod confirmation;
pub mod coverage;
pub mod error;
pub mod escrow;
pub mod id;
pub mod money;
pub mod offer;
pub mod outcome;
pub mod resolution;
pub mod spread;
pub mod wallet;

pub use allocation::{Allocation, Candidate};
pub use bid::{Bid, BidConfirmation, NewBid};
pub use coverage::CoverageEntry;
pub use escrow::{Escrow, EscrowSplit, NewEscrow, Payout, PayoutParty};
pub use id::{BidId, EscrowId, EventId, OfferId, OutcomeId, RecordHash, TxHash, UserId, WalletId};
pub use money::{Amount, CommissionRate, Odds};
pub use offer::{NewOffer, Offer};
pub use outcome::{CloseWindow, Event, NewEvent, NewOutcome, Outcome, OutcomeFilter, OutcomeType};
pub use resolution::{ResolutionReport, Standing};
pub use spread::{ActivePositions, OfferBook, Spread};
pub use wallet::Wallet;
