//! Meli-Leads main entry point
//!
//! This is the command-line interface for the Meli-Leads seller harvester.

use anyhow::Context;
use clap::Parser;
use meli_leads::config::{load_config_with_hash, Config};
use meli_leads::crawler::run_crawl;
use meli_leads::seeds::load_seeds;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Meli-Leads: a marketplace seller-lead harvester
///
/// Meli-Leads walks category listings for every (city, category) seed,
/// follows each product to its seller storefront and stores the seller's
/// reputation facts as leads in a local warehouse.
#[derive(Parser, Debug)]
#[command(name = "meli-leads")]
#[command(version)]
#[command(about = "A marketplace seller-lead harvester", long_about = None)]
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

    /// Validate config and seeds, show the listings that would be walked
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the warehouse and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("meli_leads=info,warn"),
            1 => EnvFilter::new("meli_leads=debug,info"),
            2 => EnvFilter::new("meli_leads=trace,debug"),
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

/// Handles the --dry-run mode: validates config and seeds, lists the walks
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Meli-Leads Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Root URL: {}", config.crawler.root_url);
    println!("  Max pages per seed: {}", config.crawler.max_pages);
    println!(
        "  Pre-request pause: {}ms",
        config.crawler.pre_request_pause_ms
    );
    println!(
        "  Retries: {} attempts, {}ms cooldown",
        config.crawler.retry_attempts, config.crawler.retry_cooldown_ms
    );
    println!(
        "  Skip known vendors: {}",
        config.crawler.skip_known_vendors
    );

    println!("\nRenderer:");
    println!("  Kind: {:?}", config.renderer.kind);
    println!("  WebDriver URL: {}", config.renderer.webdriver_url);

    println!("\nWarehouse:");
    println!("  Database: {}", config.warehouse.database_path);
    println!("  Country: {}", config.warehouse.country);
    for (name, value) in config.warehouse.labels() {
        println!("  {}: {}", name, value);
    }

    let seeds = load_seeds(Path::new(&config.seeds.path))
        .with_context(|| format!("Failed to load seeds from {}", config.seeds.path))?;

    println!("\nSeeds ({}):", seeds.len());
    for seed in &seeds {
        println!(
            "  - {} / {}: {}",
            seed.city,
            seed.category,
            seed.listing_url(&config.crawler.root_url)
        );
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would walk {} listings", seeds.len());

    Ok(())
}

/// Handles the --stats mode: shows statistics from the warehouse
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use meli_leads::output::{load_statistics, print_statistics};
    use meli_leads::storage::open_storage;

    println!("Database: {}\n", config.warehouse.database_path);

    let storage = open_storage(
        Path::new(&config.warehouse.database_path),
        &config.warehouse.country,
    )
    .context("Failed to open warehouse")?;

    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Renderer: {:?}, seeds: {}, warehouse: {}",
        config.renderer.kind,
        config.seeds.path,
        config.warehouse.database_path
    );

    match run_crawl(config, config_hash).await {
        Ok(stats) => {
            tracing::info!("Crawl finished: {} leads stored", stats.inserted);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
