//! Kiosque main entry point
//!
//! This is the command-line interface for the Kiosque news scraper.

use anyhow::Context;
use clap::Parser;
use kiosque::adapter::{SelectorAdapter, SiteAdapter};
use kiosque::config::{load_config_with_hash, Config};
use kiosque::crawler::Orchestrator;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

/// Kiosque: an incremental news-site scraper
///
/// Kiosque walks the category listings of a news site, scrapes every article
/// it has not seen before and appends it to a JSON snapshot. By default it
/// runs at startup and then on a fixed interval until interrupted.
#[derive(Parser, Debug)]
#[command(name = "kiosque")]
#[command(version = "1.0.0")]
#[command(about = "An incremental news-site scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run once and exit instead of scraping on a schedule
    #[arg(long)]
    once: bool,

    /// Ignore stored progress and the previous snapshot for this invocation
    #[arg(long)]
    fresh: bool,

    /// Validate config and show the listing URLs without scraping
    #[arg(long, conflicts_with_all = ["once", "fresh"])]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    handle_scrape(config, cli.once, cli.fresh).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kiosque=info,warn"),
            1 => EnvFilter::new("kiosque=debug,info"),
            2 => EnvFilter::new("kiosque=trace,debug"),
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

/// Handles the --dry-run mode: prints what a run would scrape
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let adapter = SelectorAdapter::from_config(config)?;

    println!("=== Kiosque Dry Run ===\n");

    println!("Site:");
    println!("  Name: {}", config.site.name);
    println!("  Base URL: {}", config.site.base_url);
    match config.site.freshness_window_days {
        Some(days) => println!("  Freshness window: {} days", days),
        None => println!("  Freshness window: none"),
    }

    println!("\nCrawler:");
    println!(
        "  Max concurrent articles: {}",
        config.crawler.max_concurrent_articles
    );
    println!("  Max attempts: {}", config.crawler.max_attempts);
    println!("  Backoff base: {}ms", config.crawler.backoff_base_ms);
    println!("  Retry statuses: {:?}", config.crawler.retry_statuses);
    if let Some(max_pages) = config.crawler.max_pages {
        println!("  Max pages per category: {}", max_pages);
    }

    println!("\nOutput:");
    println!("  Articles: {}", config.output.articles_path);
    println!("  Progress: {}", config.output.progress_path);
    println!("  Interval: {}s", config.schedule.interval_secs);

    println!("\nCategories ({}):", config.categories.len());
    for category in &config.categories {
        println!("  - {}", category.name);
        for page in 1..=2 {
            println!("    * page {}: {}", page, adapter.listing_url(&category.name, page)?);
        }
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles scraping, either once or on the configured interval
async fn handle_scrape(config: Config, once: bool, fresh: bool) -> anyhow::Result<()> {
    let interval_secs = config.schedule.interval_secs;
    let mut orchestrator =
        Orchestrator::from_config(config, fresh).context("Failed to initialize scraper")?;

    if once {
        orchestrator.run_once().await;
        return Ok(());
    }

    tracing::info!("Scraping every {}s, press Ctrl-C to stop", interval_secs);

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = interval.tick() => {}
        }

        // Progress is persisted after every page, so an interrupted run
        // resumes where it stopped.
        tokio::select! {
            _ = &mut shutdown => break,
            summary = orchestrator.run_once() => {
                tracing::info!(
                    new_articles = summary.new_articles(),
                    "Next run in {}s",
                    interval_secs
                );
            }
        }
    }

    tracing::info!("Shutting down");
    Ok(())
}
