use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use promoserve::cli::Cli;
use promoserve::config::{get_config, init_config};
use promoserve::interfaces::cli::run_cli_command;
use promoserve::system::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_config(cli.config.as_deref());
    let config = get_config();

    let guard = init_logging(&config.logging).context("Failed to initialise logging")?;
    debug!("Configuration loaded, dispatching command");

    if let Err(e) = run_cli_command(cli.command, &config).await {
        eprintln!("{}", e.format_colored());
        drop(guard);
        std::process::exit(1);
    }
    Ok(())
}
