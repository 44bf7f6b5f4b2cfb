//! Outbound adapters (driven side).

pub mod notifier;
pub mod sqlite;
pub mod verifier;
pub mod wallet;
