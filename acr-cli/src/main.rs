//! ACR CLI - Command line tool for estimating flight-cancellation risk.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "acr-cli",
    version,
    about = "Airport flight-cancellation risk toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: acr_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("starting acr-cli");
    acr_cmd::run(cli.command)
}
