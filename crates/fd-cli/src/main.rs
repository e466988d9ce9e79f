use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::Parser;
use signal_hook::consts::SIGINT;
use tracing_subscriber::EnvFilter;

use fd_cli::commands::generate::{self, GenerateArgs};
use fd_cli::{Cli, Config};

/// First Ctrl-C stops generation before the next day; a second one exits.
fn setup_signal_handler() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register_conditional_shutdown(SIGINT, 130, Arc::clone(&flag))
        .context("failed to register Ctrl-C handler")?;
    signal_hook::flag::register(SIGINT, Arc::clone(&flag))
        .context("failed to register Ctrl-C handler")?;
    Ok(flag)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // Logs go to stderr so dry-run output stays clean JSON lines
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let cancel = setup_signal_handler()?;
    let args = GenerateArgs {
        since: cli.since.as_deref(),
        until: cli.until.as_deref(),
        dry_run: cli.dry_run,
        yes: cli.yes,
    };
    generate::run(&args, &config, cancel)
}
