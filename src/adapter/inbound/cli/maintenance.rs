//! Handlers for `migrate`, `expire`, and `prune`.

use chrono::Utc;
use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::bootstrap::Ledger;
use crate::infrastructure::config::settings::Config;

/// Execute `migrate`. Opening the ledger applies pending migrations.
pub fn execute_migrate(config: &Config) -> Result<()> {
    Ledger::open(config)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "migrate",
            "database": config.database,
        }));
        return Ok(());
    }
    output::success("Database migrated");
    output::field("Database", &config.database);
    Ok(())
}

/// Execute `expire`.
pub fn execute_expire(config: &Config) -> Result<()> {
    let ledger = Ledger::open(config)?;
    let now = Utc::now();
    let closed = ledger.maintenance(config).expire_outcomes(now)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "expire",
            "closed": closed,
            "at": now,
        }));
        return Ok(());
    }
    output::success(&format!("Closed {closed} expired outcome(s)"));
    Ok(())
}

/// Execute `prune`.
pub fn execute_prune(config: &Config) -> Result<()> {
    let ledger = Ledger::open(config)?;
    let report = ledger.maintenance(config).prune_provisional(Utc::now())?;

    if output::is_json() {
        output::json_output(json!({
            "command": "prune",
            "bids_removed": report.bids_removed,
            "offers_removed": report.offers_removed,
        }));
        return Ok(());
    }
    output::success("Provisional records pruned");
    output::field("Bids", report.bids_removed);
    output::field("Offers", report.offers_removed);
    Ok(())
}
