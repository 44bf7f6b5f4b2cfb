//! Handler for the `release` command.

use serde_json::json;

use crate::adapter::inbound::cli::command::ReleaseArgs;
use crate::adapter::inbound::cli::output;
use crate::domain::EscrowId;
use crate::error::Result;
use crate::infrastructure::bootstrap::{build_payment_gateway, Ledger};
use crate::infrastructure::config::settings::Config;

/// Execute `release --escrow N`.
pub async fn execute(config: &Config, args: &ReleaseArgs) -> Result<()> {
    let gateway = build_payment_gateway(config)?;
    let ledger = Ledger::open(config)?;
    let escrow = ledger
        .settlement(config, gateway)?
        .release(EscrowId::new(args.escrow))
        .await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "release",
            "escrow": escrow,
        }));
        return Ok(());
    }

    output::success(&format!("Released {}", escrow.id));
    if let Some(hash) = &escrow.payout_hash {
        output::field("Tx hash", hash);
    }
    Ok(())
}
