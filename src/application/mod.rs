//! Application services. Orchestrate domain rules over the ports.
//!
//! Services validate input, delegate the transactional work to the
//! [`LedgerStore`](crate::port::outbound::ledger::LedgerStore), log the
//! transition, and notify after commit.

pub mod allocation;
pub mod confirmation;
pub mod coverage;
pub mod maintenance;
pub mod query;
pub mod resolution;
pub mod seeding;
pub mod settlement;

use tracing::warn;

use crate::error::Error;

/// Log a rejected request at `warn` and pass the error through.
pub(crate) fn rejected(operation: &'static str) -> impl Fn(Error) -> Error {
    move |err| {
        warn!(operation, error = %err, "request rejected");
        err
    }
}
