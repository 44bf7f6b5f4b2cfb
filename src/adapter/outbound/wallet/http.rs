//! HTTP merchant wallet gateway.
//!
//! Talks to a hosted wallet service that exposes a merchant payment
//! endpoint:
//!
//! ```text
//! GET {base_url}/merchant/{guid}/payment?password=…&to=…&amount=…
//! ```
//!
//! `amount` is in minor units. The reply carries the broadcast transaction
//! hash, or a message explaining why nothing was sent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::domain::{Amount, TxHash};
use crate::error::{Error, Result};
use crate::port::outbound::payment::{Payment, PaymentGateway};

/// Environment variable holding the escrow wallet password.
pub const ESCROW_PASSWORD_ENV: &str = "STAKEBOOK_ESCROW_PASSWORD";

/// Merchant wallet API client.
pub struct HttpPaymentGateway {
    client: Client,
    base_url: Url,
    guid: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    #[serde(default)]
    tx_hash: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl From<PaymentResponse> for Payment {
    fn from(response: PaymentResponse) -> Self {
        Self {
            tx_hash: response
                .tx_hash
                .map(TxHash::new)
                .filter(|hash| !hash.is_blank()),
            message: response.message,
        }
    }
}

impl HttpPaymentGateway {
    /// Create a gateway for the escrow wallet `guid`.
    ///
    /// # Errors
    /// Returns an error if the base URL does not parse or the HTTP client
    /// cannot be built.
    pub fn new(
        base_url: &str,
        guid: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: Url::parse(&base)?,
            guid: guid.into(),
            password: password.into(),
        })
    }

    fn payment_url(&self, destination: &str, amount: Amount) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("merchant/{}/payment", self.guid))?;
        url.query_pairs_mut()
            .append_pair("password", &self.password)
            .append_pair("to", destination)
            .append_pair("amount", &amount.minor().to_string());
        Ok(url)
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn send(&self, destination: &str, amount: Amount) -> Result<Payment> {
        let url = self.payment_url(destination, amount)?;
        debug!(to = %destination, amount = %amount, "sending wallet payment");

        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Connection(e.to_string()))?
            .json::<PaymentResponse>()
            .await?;

        let payment = Payment::from(response);
        if payment.tx_hash.is_none() {
            warn!(
                to = %destination,
                message = payment.message.as_deref().unwrap_or(""),
                "wallet returned no transaction hash"
            );
        }
        Ok(payment)
    }

    fn name(&self) -> &'static str {
        "http-merchant"
    }
}
