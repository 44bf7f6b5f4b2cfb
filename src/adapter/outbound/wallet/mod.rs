//! Wallet service adapters.

mod http;

pub use http::{HttpPaymentGateway, ESCROW_PASSWORD_ENV};
