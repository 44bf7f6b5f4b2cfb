//! Scripted wallet gateway.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{Amount, TxHash};
use crate::error::{Error, Result};
use crate::port::outbound::payment::{Payment, PaymentGateway};

/// One transfer the gateway was asked to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPayment {
    pub destination: String,
    pub amount: Amount,
}

/// Canned reply for the next `send`.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Broadcast with this hash.
    Sent(TxHash),
    /// Reachable, but nothing was sent.
    NoHash(String),
    /// Transport failure.
    Unreachable(String),
}

#[derive(Debug, Default)]
struct Inner {
    replies: VecDeque<Reply>,
    sent: Vec<SentPayment>,
    counter: u32,
    yield_first: bool,
}

/// Payment gateway that replays scripted replies.
///
/// With nothing scripted, every send succeeds with a fresh `tx-N` hash.
/// Clones share state, so a test can keep a handle after passing one to a
/// service.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPaymentGateway {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedPaymentGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for a future send.
    pub fn push(&self, reply: Reply) -> &Self {
        self.inner.lock().replies.push_back(reply);
        self
    }

    /// Yield to the runtime before each send so concurrent callers
    /// interleave around the wallet call.
    pub fn yield_before_send(&self) -> &Self {
        self.inner.lock().yield_first = true;
        self
    }

    /// Every transfer attempted so far, including failed ones.
    #[must_use]
    pub fn sent(&self) -> Vec<SentPayment> {
        self.inner.lock().sent.clone()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedPaymentGateway {
    async fn send(&self, destination: &str, amount: Amount) -> Result<Payment> {
        let yield_first = self.inner.lock().yield_first;
        if yield_first {
            tokio::task::yield_now().await;
        }
        let mut inner = self.inner.lock();
        inner.sent.push(SentPayment {
            destination: destination.to_string(),
            amount,
        });
        let reply = match inner.replies.pop_front() {
            Some(reply) => reply,
            None => {
                inner.counter += 1;
                Reply::Sent(TxHash::new(format!("tx-{}", inner.counter)))
            }
        };
        match reply {
            Reply::Sent(hash) => Ok(Payment {
                tx_hash: Some(hash),
                message: Some("Sent".into()),
            }),
            Reply::NoHash(message) => Ok(Payment {
                tx_hash: None,
                message: Some(message),
            }),
            Reply::Unreachable(reason) => Err(Error::Connection(reason)),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
