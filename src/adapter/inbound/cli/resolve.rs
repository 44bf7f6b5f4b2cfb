//! Handler for the `resolve` command.

use std::fs;

use serde_json::{json, Value};

use crate::adapter::inbound::cli::command::ResolveArgs;
use crate::adapter::inbound::cli::output;
use crate::domain::OutcomeId;
use crate::error::Result;
use crate::infrastructure::bootstrap::Ledger;
use crate::infrastructure::config::settings::Config;

/// Execute `resolve --outcome N --data file.json`.
pub fn execute(config: &Config, args: &ResolveArgs) -> Result<()> {
    let data: Value = serde_json::from_str(&fs::read_to_string(&args.data)?)?;
    let ledger = Ledger::open(config)?;
    let outcome_id = OutcomeId::new(args.outcome);
    let report = ledger.resolution().resolve(outcome_id, &data)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "resolve",
            "outcome_id": outcome_id,
            "report": report,
        }));
        return Ok(());
    }

    if report.already_resolved {
        output::success(&format!("{outcome_id} was already resolved"));
    } else {
        output::success(&format!("Resolved {outcome_id}"));
    }
    output::field("Proposition", report.proposition);
    output::field("Offers", report.offers_marked);
    output::field("Bids", report.bids_marked);
    Ok(())
}
