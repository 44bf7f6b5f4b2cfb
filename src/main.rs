use clap::Parser;
use stakebook::adapter::inbound::cli::{self, command::Cli, output};
use tracing::error;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    if let Err(e) = cli::execute(args).await {
        error!(error = %e, "Command failed");
        output::error(&e.to_string());
        std::process::exit(cli::exit_code(&e));
    }
}
