//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Generates fake data for testing ActivityWatch.
///
/// Runs against a testing server by default; set `AW_TESTING=false` to target
/// a production server.
#[derive(Debug, Parser)]
#[command(name = "aw-fakedata", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// First day to generate (YYYY-MM-DD, RFC 3339, or e.g. "14 days ago").
    /// Defaults to 14 days before --until.
    #[arg(long)]
    pub since: Option<String>,

    /// Last day to generate, inclusive. Defaults to now.
    #[arg(long)]
    pub until: Option<String>,

    /// Print events as JSON lines instead of sending them to a server.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt when running against production.
    #[arg(short, long)]
    pub yes: bool,
}
