//! Command-line interface definitions.
//!
//! Defines the operator CLI for the stakebook ledger using `clap`. Each
//! subcommand is a single pass an external scheduler can invoke; the binary
//! never schedules work itself.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

/// Collateralized wagering ledger operator CLI
#[derive(Parser, Debug)]
#[command(name = "stakebook")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the stakebook CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the embedded database migrations
    Migrate,

    /// Close outcomes whose close date has passed
    Expire,

    /// Delete provisional records older than the retention window
    Prune,

    /// Resolve an outcome from a game data file
    Resolve(ResolveArgs),

    /// Pay out an escrow through the wallet service
    Release(ReleaseArgs),

    /// Print an outcome's confirmed offers and bids
    Spread(SpreadArgs),

    /// List outcomes by close date and open flag
    Outcomes(OutcomesArgs),
}

/// Arguments for `stakebook resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Outcome id
    #[arg(long)]
    pub outcome: i32,

    /// JSON file with the game data to verify
    #[arg(long)]
    pub data: PathBuf,
}

/// Arguments for `stakebook release`.
#[derive(Args, Debug)]
pub struct ReleaseArgs {
    /// Escrow id
    #[arg(long)]
    pub escrow: i32,
}

/// Arguments for `stakebook spread`.
#[derive(Args, Debug)]
pub struct SpreadArgs {
    /// Outcome id
    #[arg(long)]
    pub outcome: i32,
}

/// Arguments for `stakebook outcomes`.
#[derive(Args, Debug, Default)]
pub struct OutcomesArgs {
    /// Only outcomes closing at or after this time (RFC 3339)
    #[arg(long)]
    pub after: Option<DateTime<Utc>>,

    /// Only outcomes closing before this time (RFC 3339)
    #[arg(long)]
    pub before: Option<DateTime<Utc>>,

    /// Only outcomes closing on this UTC day (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["after", "before"])]
    pub on: Option<NaiveDate>,

    /// Filter on the open flag
    #[arg(long)]
    pub open: Option<bool>,
}
