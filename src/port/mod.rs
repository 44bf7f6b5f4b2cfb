//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points of the ledger. Outbound adapters
//! implement them to integrate storage, the wallet service, outcome
//! verification, and notifications.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │ Wallet  │            │   Ledger    │              │ Notifier  │
//! │ Gateway │            │   Store     │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```

pub mod outbound;
