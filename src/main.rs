//! Putusan-Harvest main entry point
//!
//! This is the command-line interface for the court-directory harvester.

use clap::Parser;
use putusan_harvest::config::{load_config_with_hash, Config};
use putusan_harvest::output::print_report;
use putusan_harvest::{run_harvest, RunOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Putusan-Harvest: a resumable court-directory harvester
///
/// Walks the paginated listing of every configured source, extracts one
/// record per decision page into a checkpoint table, and downloads the
/// attached documents into a local archive. Reruns load the checkpoint and
/// skip documents that are already present.
#[derive(Parser, Debug)]
#[command(name = "putusan-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable court-directory harvester", long_about = None)]
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

    /// Delete the record checkpoint and crawl again
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be harvested without any requests
    #[arg(long, conflicts_with_all = ["fresh", "crawl_only"])]
    dry_run: bool,

    /// Stop after the record checkpoint is written
    #[arg(long)]
    crawl_only: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let options = RunOptions {
        fresh: cli.fresh,
        crawl_only: cli.crawl_only,
        config_hash,
    };
    handle_harvest(config, options).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("putusan_harvest=info,warn"),
            1 => EnvFilter::new("putusan_harvest=debug,info"),
            2 => EnvFilter::new("putusan_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows the resolved plan for this configuration
fn handle_dry_run(config: &Config) {
    println!("=== Putusan-Harvest Dry Run ===\n");

    println!("Run:");
    println!("  Category: {}", config.run.category);
    println!("  Year: {}", config.run.year);
    println!("  Directory: {}", config.run.directory);

    println!("\nSources ({}):", config.run.sources.len());
    for source in config.sources() {
        println!("  - {} ({})", source.id, config.site.listing_url(&source, 1));
    }

    println!("\nCrawler:");
    println!(
        "  Max consecutive errors: {}",
        config.crawler.max_consecutive_errors
    );
    println!(
        "  Page delay: {}-{}ms",
        config.crawler.page_delay.min_ms, config.crawler.page_delay.max_ms
    );
    println!(
        "  Detail delay: {}-{}ms",
        config.crawler.detail_delay.min_ms, config.crawler.detail_delay.max_ms
    );
    println!("  User agents: {}", config.http.user_agents.len());

    println!("\nDownload:");
    println!("  Workers: {}", config.download.workers);
    println!("  Max retries: {}", config.download.max_retries);
    println!("  Timeout: {}s", config.http.download_timeout_secs);

    println!("\nOutput:");
    let checkpoint = config.checkpoint_path();
    let state = if checkpoint.is_file() {
        "present, crawl will be skipped"
    } else {
        "absent, sources will be crawled"
    };
    println!("  Checkpoint: {} ({})", checkpoint.display(), state);
    println!("  Archive: {}", config.output.archive_dir.display());
    println!("  Logs: {}", config.output.log_dir.display());

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: Config,
    options: RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Harvesting {} {} from {} sources",
        config.run.category,
        config.run.year,
        config.run.sources.len()
    );

    match run_harvest(config, options).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
