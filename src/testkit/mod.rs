//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`payment`] - [`ScriptedPaymentGateway`](payment::ScriptedPaymentGateway),
//!   a wallet double that replays canned replies and records every send.
//! - [`notifier`] - [`RecordingNotifier`](notifier::RecordingNotifier).
//! - [`domain`] - Builders for game data, events, and outcomes.
//! - [`store`] - Migrated SQLite ledgers for tests.

pub mod domain;
pub mod notifier;
pub mod payment;
pub mod store;
