mod archiver;
mod dates;
mod error;
mod fetcher;
mod models;
mod parser;
mod pipeline;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Url;
use tracing_subscriber::EnvFilter;

use crate::dates::ActivePolicy;
use crate::fetcher::Fetcher;
use crate::pipeline::{RunReport, Scraper};

/// Archive the leaflets that are currently running on a leaflet aggregator site.
#[derive(Debug, Parser)]
#[command(name = "leaflet-archiver", version)]
struct Cli {
    /// Site root; shop links are resolved against it
    #[arg(long, env = "LEAFLETS_BASE_URL", default_value = "https://www.prospektmaschine.de")]
    base_url: Url,

    /// Path of the category page listing the shops
    #[arg(long, env = "LEAFLETS_CATEGORY_PATH", default_value = "/hypermarkte/")]
    category_path: String,

    #[arg(short, long, env = "LEAFLETS_OUTPUT", default_value = "leaflets.json")]
    output: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, env = "LEAFLETS_TIMEOUT_SECS", default_value_t = fetcher::DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// User-Agent header to send (none by default)
    #[arg(long, env = "LEAFLETS_USER_AGENT")]
    user_agent: Option<String>,

    /// Also keep leaflets that only print a single (last) date
    #[arg(long)]
    include_open_start: bool,

    /// Abort on the first shop that fails instead of skipping it
    #[arg(long)]
    fail_fast: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let policy = if cli.include_open_start {
        ActivePolicy::IncludeOpenStart
    } else {
        ActivePolicy::FullRangeOnly
    };

    let fetcher = Fetcher::new(Duration::from_secs(cli.timeout_secs), cli.user_agent)
        .context("failed to build HTTP client")?;
    let scraper = Scraper::new(fetcher, cli.base_url, cli.category_path)
        .with_policy(policy)
        .fail_fast(cli.fail_fast);

    let report = scraper.run()?;
    archiver::save_to_file(&report.leaflets, &cli.output)?;

    print_summary(&report, &cli.output);
    Ok(())
}

fn print_summary(report: &RunReport, output: &std::path::Path) {
    println!(
        "Archived {} leaflets from {} shops to {}.",
        report.leaflets.len(),
        report.shops_visited,
        output.display()
    );
    if report.failures.is_empty() {
        return;
    }

    println!("{} shops failed:", report.failures.len());
    for failure in &report.failures {
        println!("  {} ({}): {}", failure.shop.name, failure.shop.url, failure.error);
    }
}
