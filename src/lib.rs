//! Stakebook - collateralized peer-to-peer wagering ledger.
//!
//! Offer writers post collateral ("coverage") against a binary outcome at
//! fixed odds. Bidders consume that coverage. Both sides confirm their
//! positions once the funding transaction is observed, funds are held in
//! escrow, and escrows pay out to the winning side after the outcome is
//! resolved from verified game data.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - Entities, money types, and pure ledger rules
//! - [`port`] - Traits the application needs from the outside world
//! - [`application`] - Services: allocation, confirmation, resolution,
//!   settlement, queries, and maintenance
//! - [`adapter`] - SQLite store, HTTP wallet gateway, verifiers, notifiers,
//!   and the operator CLI
//! - [`infrastructure`] - Configuration and runtime wiring
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `testkit` - Test doubles and fixtures for integration tests
//!
//! # Example
//!
//! ```no_run
//! use stakebook::infrastructure::bootstrap::Ledger;
//! use stakebook::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     let ledger = Ledger::open(&config)?;
//!     let closed = ledger.maintenance(&config).expire_outcomes(chrono::Utc::now())?;
//!     println!("closed {closed} outcomes");
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
