//! Generate command: build the fake activity and send or print it.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use fd_client::{BlockingClient, ClientConfig};
use fd_core::{BucketEvents, BucketKind, CatalogFile, Catalogs, Event, Generator, TimeRange};
use figment::Figment;
use figment::providers::{Format, Toml};
use serde::Serialize;

use crate::Config;
use crate::commands::util::parse_datetime;

/// Days generated when `--since` is omitted.
const DEFAULT_RANGE_DAYS: i64 = 14;

/// Resolved command options.
#[derive(Debug)]
pub struct GenerateArgs<'a> {
    pub since: Option<&'a str>,
    pub until: Option<&'a str>,
    pub dry_run: bool,
    pub yes: bool,
}

/// One line of dry-run output.
#[derive(Debug, Serialize)]
struct EventLine<'a> {
    bucket: &'a str,
    #[serde(flatten)]
    event: &'a Event,
}

pub fn run(args: &GenerateArgs<'_>, config: &Config, cancel: Arc<AtomicBool>) -> Result<()> {
    let range = resolve_range(args.since, args.until, Utc::now())?;
    tracing::info!(since = %range.start(), until = %range.stop(), "generating fake data");

    let catalogs = load_catalogs(config.catalog_path.as_deref())?;
    let generator = Generator::new(catalogs, config.profile.clone(), config.hostname.clone())
        .context("invalid generator settings")?
        .with_cancellation(cancel);

    if args.dry_run {
        let buckets = generator.buckets(&range)?;
        let stdout = io::stdout();
        write_jsonl(&buckets, &mut stdout.lock())?;
        return Ok(());
    }

    if !config.testing && !args.yes && io::stdin().is_terminal() {
        let bucket_ids: Vec<String> = BucketKind::ALL
            .iter()
            .map(|kind| kind.bucket_id(&config.hostname))
            .collect();
        let stdin = io::stdin();
        if !confirm_production(&mut stdin.lock(), &mut io::stdout(), &bucket_ids)? {
            println!("Exiting");
            return Ok(());
        }
    }

    let server_url = config.server_url();
    let client = BlockingClient::new(ClientConfig {
        server_url: server_url.clone(),
        client_name: config.client_name.clone(),
        hostname: config.hostname.clone(),
        batch_size: config.batch_size,
    })
    .context("failed to create ActivityWatch client")?;

    tracing::info!(%server_url, testing = config.testing, "setting up buckets");
    fd_core::setup_buckets(&client, &config.hostname)
        .with_context(|| format!("failed to set up buckets on {server_url}"))?;

    let report = generator.generate(&client, &range)?;
    for bucket in &report.buckets {
        println!("Sent {} events to bucket {}", bucket.events, bucket.bucket_id);
    }
    tracing::info!(total = report.total_events(), "done");

    Ok(())
}

/// Turns the CLI bounds into a range. `until` defaults to `now`, `since` to
/// 14 days before `until`.
pub fn resolve_range(
    since: Option<&str>,
    until: Option<&str>,
    now: DateTime<Utc>,
) -> Result<TimeRange> {
    let until = match until {
        Some(s) => parse_datetime(s, now).context("invalid --until")?,
        None => now,
    };
    let since = match since {
        Some(s) => parse_datetime(s, now).context("invalid --since")?,
        None => until - Duration::days(DEFAULT_RANGE_DAYS),
    };
    TimeRange::new(since, until).context("--since must be before --until")
}

/// Built-in catalogs, with sections replaced from `path` when given.
pub fn load_catalogs(path: Option<&Path>) -> Result<Catalogs> {
    let Some(path) = path else {
        return Ok(Catalogs::builtin()?);
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file {}", path.display()))?;
    let file: CatalogFile = Figment::from(Toml::string(&contents))
        .extract()
        .with_context(|| format!("failed to parse catalog file {}", path.display()))?;
    Catalogs::with_overrides(file)
        .with_context(|| format!("invalid catalog file {}", path.display()))
}

/// Writes every event as one JSON object per line, bucket by bucket.
pub fn write_jsonl<W: Write>(buckets: &[BucketEvents], out: &mut W) -> Result<()> {
    for bucket in buckets {
        for event in &bucket.events {
            let line = EventLine {
                bucket: &bucket.bucket_id,
                event,
            };
            serde_json::to_writer(&mut *out, &line)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Asks before wiping production buckets. Only an exact `y` proceeds.
fn confirm_production<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    bucket_ids: &[String],
) -> Result<bool> {
    write!(
        output,
        "Running in prod, are you sure you want to delete the existing buckets?\n{bucket_ids:?}\nAre you sure? (y/N) "
    )?;
    output.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(answer.trim_end_matches(['\r', '\n']) == "y")
}
