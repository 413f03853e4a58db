//! Press-Ripple main entry point
//!
//! This is the command-line interface for the Press-Ripple article harvester.

use anyhow::{Context, Result};
use clap::Parser;
use press_ripple::config::{load_config, Config};
use press_ripple::crawler::print_statistics;
use press_ripple::CrawlSession;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Press-Ripple: an article harvester for news sites
///
/// Press-Ripple crawls a single site outward from a root URL, pacing its
/// requests by load, and prints the pages it classifies as articles after
/// every round.
#[derive(Parser, Debug)]
#[command(name = "press-ripple")]
#[command(version)]
#[command(about = "An article harvester for news sites", long_about = None)]
struct Cli {
    /// Root URL of the site to crawl
    #[arg(value_name = "ROOT_URL")]
    root_url: String,

    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Number of crawl rounds (overrides the configuration)
    #[arg(short = 'n', long)]
    iterations: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print crawl statistics when the crawl ends
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    let iterations = cli.iterations.unwrap_or(config.crawler.max_iterations);
    tracing::info!(
        "Ceiling: {}, threshold: {}, rounds: {}",
        config.dispatch.max_concurrent_requests,
        config.classifier.confidence_threshold,
        iterations
    );

    let mut session = CrawlSession::new(config).context("Failed to set up crawl session")?;
    handle_crawl(&mut session, &cli.root_url, iterations).await?;

    if cli.stats {
        println!();
        print_statistics(session.statistics());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("press_ripple=info,warn"),
            1 => EnvFilter::new("press_ripple=debug,info"),
            2 => EnvFilter::new("press_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Runs the crawl and prints each round's accepted articles
async fn handle_crawl(session: &mut CrawlSession, root_url: &str, iterations: u32) -> Result<()> {
    let mut crawl = session
        .crawl(root_url, iterations)
        .with_context(|| format!("Cannot crawl {}", root_url))?;

    while let Some(batch) = crawl.next_batch().await {
        println!("=== Round {} ({} articles) ===", batch.round(), batch.len());
        for article in &batch {
            println!(
                "  [{:.2}] {} - {}",
                article.confidence,
                article.display_title(),
                article.url
            );
        }
    }

    tracing::info!("{} articles accepted in total", session.accepted_urls().len());
    Ok(())
}
