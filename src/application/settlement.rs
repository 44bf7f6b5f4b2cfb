//! Escrow funding and payout through the wallet collaborator.
//!
//! Every wallet call happens outside a ledger transaction. Before sending,
//! the caller takes a claim on the bid (funding) or escrow (payout) in the
//! store; only the claim holder sends, and a failed send drops the claim.
//! The store then records what the wallet did, keyed by transaction hash.
//! A crash after sending leaves the claim in place until the transfer is
//! reconciled from the wallet's history.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::confirmation::validate_tx_hash;
use crate::domain::{
    Amount, Bid, BidId, CommissionRate, Escrow, EscrowId, EscrowSplit, NewEscrow, Payout, RecordHash, TxHash,
    UserId, Wallet, WalletId,
};
use crate::error::{LedgerError, Result};
use crate::port::outbound::ledger::{EscrowStore, FundingClaim, LedgerStore, PositionStore, SettlementContext};
use crate::port::outbound::notifier::{Notification, NotifierRegistry};
use crate::port::outbound::payment::PaymentGateway;

use super::rejected;

/// House commission and the custody address escrows are funded into.
#[derive(Debug, Clone)]
pub struct SettlementTerms {
    pub rate: CommissionRate,
    pub escrow_address: String,
}

/// A release that has been computed but not yet sent.
#[derive(Debug, Clone)]
pub struct PayoutQuote {
    pub payout: Payout,
    pub destination: Wallet,
}

pub struct SettlementService {
    store: Arc<dyn LedgerStore>,
    gateway: Arc<dyn PaymentGateway>,
    notifiers: Arc<NotifierRegistry>,
    terms: SettlementTerms,
}

impl SettlementService {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifiers: Arc<NotifierRegistry>,
        terms: SettlementTerms,
    ) -> Self {
        Self {
            store,
            gateway,
            notifiers,
            terms,
        }
    }

    #[must_use]
    pub fn terms(&self) -> &SettlementTerms {
        &self.terms
    }

    /// Register a payout address for `caller`.
    ///
    /// The most recently registered wallet is the payout destination.
    pub fn register_wallet(&self, caller: UserId, address: &str) -> Result<Wallet> {
        let wallet = self
            .store
            .insert_wallet(caller, address.trim())
            .map_err(rejected("register_wallet"))?;
        info!(wallet_id = %wallet.id, user = %caller, "Wallet registered");
        Ok(wallet)
    }

    /// Move a confirmed bid's value into custody.
    ///
    /// Returns the existing escrow if the bid has already been funded.
    ///
    /// # Errors
    /// `NotFound`, `NotOwner` for someone else's bid or wallet,
    /// `BidNotConfirmed`, `TransferInFlight` while another funding of the
    /// bid is underway, or `PayoutFailed` when the wallet call fails.
    pub async fn fund(&self, bid_id: BidId, wallet_id: WalletId, caller: UserId) -> Result<Escrow> {
        self.fund_inner(bid_id, wallet_id, caller)
            .await
            .map_err(rejected("fund_escrow"))
    }

    async fn fund_inner(&self, bid_id: BidId, wallet_id: WalletId, caller: UserId) -> Result<Escrow> {
        let (bid, split) = self.funding_terms(bid_id, wallet_id, caller)?;

        let claim = RecordHash::generate();
        if let FundingClaim::Funded(existing) = self.store.claim_funding(bid_id, claim.as_str())? {
            return Ok(existing);
        }
        let incoming_hash = match self.send(&self.terms.escrow_address, bid.value).await {
            Ok(hash) => hash,
            Err(err) => {
                self.store.release_funding_claim(bid_id, claim.as_str())?;
                return Err(err);
            }
        };

        let escrow = self.store.record_escrow(&NewEscrow {
            offer_id: bid.offer_id,
            bid_id,
            wallet_id,
            split,
            incoming_hash,
        })?;
        info!(
            escrow_id = %escrow.id,
            %bid_id,
            value = %escrow.value,
            commission = %escrow.commission,
            tx_hash = %escrow.incoming_hash,
            "Escrow funded"
        );
        Ok(escrow)
    }

    /// Record a funding transfer observed outside this process, clearing
    /// any funding claim a crashed caller left on the bid.
    ///
    /// Repeating the same hash is a no-op.
    ///
    /// # Errors
    /// As [`fund`](Self::fund), plus `Validation` for a blank hash and
    /// `AlreadyFunded` when the bid was funded under another hash.
    pub fn reconcile_funding(
        &self,
        bid_id: BidId,
        wallet_id: WalletId,
        caller: UserId,
        incoming_hash: &TxHash,
    ) -> Result<Escrow> {
        let escrow = self
            .reconcile_funding_inner(bid_id, wallet_id, caller, incoming_hash)
            .map_err(rejected("reconcile_funding"))?;
        info!(escrow_id = %escrow.id, %bid_id, tx_hash = %incoming_hash, "Funding reconciled");
        Ok(escrow)
    }

    fn reconcile_funding_inner(
        &self,
        bid_id: BidId,
        wallet_id: WalletId,
        caller: UserId,
        incoming_hash: &TxHash,
    ) -> Result<Escrow> {
        validate_tx_hash(incoming_hash)?;
        let (bid, split) = self.funding_terms(bid_id, wallet_id, caller)?;
        self.store.record_escrow(&NewEscrow {
            offer_id: bid.offer_id,
            bid_id,
            wallet_id,
            split,
            incoming_hash: incoming_hash.clone(),
        })
    }

    fn funding_terms(&self, bid_id: BidId, wallet_id: WalletId, caller: UserId) -> Result<(Bid, EscrowSplit)> {
        let bid = self
            .store
            .bid(bid_id)?
            .ok_or_else(|| LedgerError::not_found("bid", bid_id))?;
        if bid.user_id != caller {
            return Err(LedgerError::NotOwner { entity: "bid" }.into());
        }
        if !bid.is_confirmed() {
            return Err(LedgerError::BidNotConfirmed { bid_id: bid_id.value() }.into());
        }
        let wallet = self
            .store
            .wallet(wallet_id)?
            .ok_or_else(|| LedgerError::not_found("wallet", wallet_id))?;
        if wallet.user_id != caller {
            return Err(LedgerError::NotOwner { entity: "wallet" }.into());
        }
        let split = EscrowSplit::compute(bid.value, self.terms.rate)?;
        Ok((bid, split))
    }

    /// Compute who a release would pay, and how much, without sending.
    ///
    /// # Errors
    /// `EscrowInactive`, `BidUnresolved`, or `NotFound` when the recipient
    /// has no registered wallet.
    pub fn quote(&self, escrow_id: EscrowId) -> Result<PayoutQuote> {
        let context = self.store.settlement_context(escrow_id)?;
        self.quote_context(&context)
    }

    fn quote_context(&self, context: &SettlementContext) -> Result<PayoutQuote> {
        let SettlementContext { escrow, bid, offer } = context;
        if !escrow.active {
            return Err(LedgerError::EscrowInactive {
                escrow_id: escrow.id.value(),
            }
            .into());
        }
        let bid_won = bid.result.ok_or(LedgerError::BidUnresolved {
            bid_id: bid.id.value(),
        })?;

        let payout = Payout::compute(
            bid.value,
            offer.odds,
            self.terms.rate,
            bid_won,
            bid.user_id,
            offer.user_id,
        )?;
        let destination = self
            .store
            .wallet_for_user(payout.recipient)?
            .ok_or_else(|| LedgerError::not_found("wallet", payout.recipient))?;
        Ok(PayoutQuote { payout, destination })
    }

    /// Pay out a resolved escrow to the winning side.
    ///
    /// Only one caller sends per escrow. A failed send leaves the escrow
    /// active so the release can be retried.
    ///
    /// # Errors
    /// `EscrowInactive`, `BidUnresolved`, `TransferInFlight` while another
    /// release is underway, `PayoutFailed`, or `PayoutConflict` if the
    /// escrow was reconciled under another hash meanwhile.
    pub async fn release(&self, escrow_id: EscrowId) -> Result<Escrow> {
        self.release_inner(escrow_id)
            .await
            .map_err(rejected("release_escrow"))
    }

    async fn release_inner(&self, escrow_id: EscrowId) -> Result<Escrow> {
        let PayoutQuote { payout, destination } = self.quote(escrow_id)?;

        let claim = RecordHash::generate();
        self.store.claim_payout(escrow_id, claim.as_str())?;
        let tx_hash = match self.send(&destination.address, payout.amount).await {
            Ok(hash) => hash,
            Err(err) => {
                self.store.release_payout_claim(escrow_id, claim.as_str())?;
                return Err(err);
            }
        };

        let escrow = self.store.complete_payout(escrow_id, &tx_hash, Utc::now())?;
        info!(
            %escrow_id,
            party = ?payout.party,
            amount = %payout.amount,
            %tx_hash,
            "Escrow released"
        );
        self.notifiers.notify_all(Notification::EscrowReleased {
            escrow_id,
            party: payout.party,
            amount: payout.amount,
            tx_hash,
        });
        Ok(escrow)
    }

    /// Record a payout observed outside this process.
    ///
    /// Repeating the same hash is a no-op.
    ///
    /// # Errors
    /// `Validation` for a blank hash, `NotFound`, or `PayoutConflict` when
    /// the escrow was paid under a different hash.
    pub fn reconcile_payout(&self, escrow_id: EscrowId, tx_hash: &TxHash) -> Result<Escrow> {
        validate_tx_hash(tx_hash).map_err(|e| rejected("reconcile_payout")(e.into()))?;
        let escrow = self
            .store
            .complete_payout(escrow_id, tx_hash, Utc::now())
            .map_err(rejected("reconcile_payout"))?;
        info!(%escrow_id, %tx_hash, "Payout reconciled");
        Ok(escrow)
    }

    async fn send(&self, destination: &str, amount: Amount) -> Result<TxHash> {
        let payment = self
            .gateway
            .send(destination, amount)
            .await
            .map_err(|e| LedgerError::PayoutFailed { reason: e.to_string() })?;
        match payment.tx_hash {
            Some(hash) => Ok(hash),
            None => {
                let reason = payment
                    .message
                    .unwrap_or_else(|| format!("{} returned no transaction hash", self.gateway.name()));
                warn!(gateway = self.gateway.name(), %amount, %reason, "Wallet send failed");
                Err(LedgerError::PayoutFailed { reason }.into())
            }
        }
    }
}
