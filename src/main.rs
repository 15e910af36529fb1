//! Shelf-Harvest main entry point
//!
//! This is the command-line interface for the vendor catalog harvester.

use clap::Parser;
use shelf_harvest::config::load_config_with_hash;
use shelf_harvest::crawler::run_harvest;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shelf-Harvest: a single-vendor product listing harvester
///
/// Shelf-Harvest crawls a paginated vendor listing, extracts product data
/// from every detail page, and writes two JSON files: the raw extracted
/// records and the same products mapped to the catalog schema.
#[derive(Parser, Debug)]
#[command(name = "shelf-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A single-vendor product listing harvester", long_about = None)]
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

    /// Validate config and show the harvest plan without fetching
    #[arg(long)]
    dry_run: bool,

    /// Cap the number of listing pages fetched
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

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
        handle_dry_run(&config, &config_hash);
        return Ok(());
    }

    match run_harvest(config, cli.max_pages).await {
        Ok(report) => {
            tracing::info!(
                "Harvest completed: {} products, {} failures",
                report.products,
                report.failures.len()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_harvest=info,warn"),
            1 => EnvFilter::new("shelf_harvest=debug,info"),
            2 => EnvFilter::new("shelf_harvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the harvest plan
fn handle_dry_run(config: &shelf_harvest::config::Config, config_hash: &str) {
    println!("=== Shelf-Harvest Dry Run ===\n");

    println!("Listing:");
    println!("  URL: {}", config.listing.url);
    println!("  Vendor id: {}", config.listing.vendor_id);
    println!("  Default category: {}", config.listing.default_category_id);
    println!("  Product prefix: {}", config.listing.product_path_prefix);

    println!("\nHTTP:");
    println!("  Max workers: {}", config.http.max_workers);
    println!("  Max retries: {}", config.http.max_retries);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  Backoff: {}ms", config.http.backoff_ms);
    println!("  User agent: {}", config.http.user_agent);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);

    println!("\nCategory map ({} entries):", config.category_map.len());
    for (path, category_id) in &config.category_map {
        println!("  - {} -> {}", path, category_id);
    }

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
}
