//! CLI module graph and dispatch.

pub mod command;
pub mod maintenance;
pub mod output;
pub mod query;
pub mod release;
pub mod resolve;

use crate::error::{Error, ErrorKind, Result};
use crate::infrastructure::config::settings::Config;

use command::{Cli, Commands};

/// Load configuration, start logging, and run one command.
///
/// # Errors
/// Returns the command's error; map it with [`exit_code`].
pub async fn execute(cli: Cli) -> Result<()> {
    output::configure(output::OutputConfig { json: cli.json });

    let config = Config::load(&cli.config)?;
    config.init_logging();

    match cli.command {
        Commands::Migrate => maintenance::execute_migrate(&config),
        Commands::Expire => maintenance::execute_expire(&config),
        Commands::Prune => maintenance::execute_prune(&config),
        Commands::Resolve(args) => resolve::execute(&config, &args),
        Commands::Release(args) => release::execute(&config, &args).await,
        Commands::Spread(args) => query::execute_spread(&config, &args),
        Commands::Outcomes(args) => query::execute_outcomes(&config, &args),
    }
}

/// Process exit code for a failed command.
#[must_use]
pub fn exit_code(err: &Error) -> i32 {
    match err.kind() {
        Some(ErrorKind::Validation) => 2,
        Some(ErrorKind::Conflict) => 3,
        Some(ErrorKind::Authorization) => 4,
        Some(ErrorKind::Capacity) => 5,
        Some(ErrorKind::State) => 6,
        Some(ErrorKind::External) => 7,
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Amount;
    use crate::error::{ConfigError, LedgerError};

    #[test]
    fn exit_codes_follow_error_kind() {
        let cases: [(Error, i32); 7] = [
            (LedgerError::validation("odds", "bad").into(), 2),
            (LedgerError::AlreadyConfirmed { entity: "bid" }.into(), 3),
            (LedgerError::NotOwner { entity: "bid" }.into(), 4),
            (
                LedgerError::InsufficientCoverage {
                    requested: Amount::from_minor(2),
                    available: Amount::from_minor(1),
                }
                .into(),
                5,
            ),
            (LedgerError::EscrowInactive { escrow_id: 1 }.into(), 6),
            (LedgerError::PayoutFailed { reason: "down".into() }.into(), 7),
            (ConfigError::MissingField { field: "database" }.into(), 1),
        ];
        for (err, code) in cases {
            assert_eq!(exit_code(&err), code, "{err}");
        }
    }
}
