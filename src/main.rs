//! Catalog-Sweep main entry point
//!
//! This is the command-line interface for the Catalog-Sweep parts catalog crawler.

use anyhow::Context;
use catalog_sweep::config::{load_config_with_hash, validate, Config};
use catalog_sweep::crawler::{known_category_urls, run_crawl, PageFetcher};
use catalog_sweep::output::print_summary;
use catalog_sweep::url::select_categories;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog-Sweep: a retail parts catalog crawler
///
/// Catalog-Sweep walks category listings through load-more, button and URL
/// pagination, extracts every product page, and writes a JSON report with a
/// CSV companion.
#[derive(Parser, Debug)]
#[command(name = "catalog-sweep")]
#[command(version)]
#[command(about = "Crawls a parts catalog into structured product records", long_about = None)]
struct Cli {
    /// Categories to scrape, comma separated (default: all)
    #[arg(short, long, value_delimiter = ',')]
    categories: Vec<String>,

    /// Output JSON file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Delay between requests in seconds
    #[arg(short, long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Max products per category
    #[arg(short, long, value_name = "N")]
    max_products: Option<usize>,

    /// Show the browser window
    #[arg(long)]
    no_headless: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// List known categories and exit
    #[arg(long, conflicts_with = "dry_run")]
    list_categories: bool,

    /// Path to an optional TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Show the resolved configuration and selected categories without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if cli.list_categories {
        let config = load_config(&cli).context("failed to load configuration")?;
        println!("Known categories:");
        for slug in config.site.categories.keys() {
            println!("  - {}", slug);
        }
        return Ok(());
    }

    let mut config = load_config(&cli).context("failed to load configuration")?;
    apply_overrides(&mut config, &cli);
    validate(&config).context("invalid settings after applying command-line flags")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_sweep=info,warn"),
            1 => EnvFilter::new("catalog_sweep=debug,info"),
            2 => EnvFilter::new("catalog_sweep=trace,debug"),
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

/// Loads the configuration file if one was given, else the defaults
fn load_config(cli: &Cli) -> catalog_sweep::Result<Config> {
    let Some(path) = &cli.config else {
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Command-line flags take precedence over file values
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if !cli.categories.is_empty() {
        config.crawler.categories = cli.categories.clone();
    }
    if let Some(output) = &cli.output {
        config.output.json_path = output.display().to_string();
    }
    if let Some(delay) = cli.delay {
        config.crawler.delay_ms = (delay.max(0.0) * 1000.0).round() as u64;
    }
    if let Some(max_products) = cli.max_products {
        config.crawler.max_products_per_category = Some(max_products);
    }
    if cli.no_headless {
        config.crawler.headless = false;
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Catalog-Sweep Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Delay between requests: {}ms", config.crawler.delay_ms);
    match config.crawler.max_products_per_category {
        Some(cap) => println!("  Max products per category: {}", cap),
        None => println!("  Max products per category: unlimited"),
    }
    println!("  Page load timeout: {}s", config.crawler.page_load_timeout_secs);
    println!("  Wait timeout: {}s", config.crawler.wait_timeout_secs);
    println!("  Load-more ceiling: {}", config.crawler.load_more_ceiling);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Headless: {}", config.crawler.headless);

    println!("\nSite:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Parts index: {}", config.site.parts_path);
    println!("  User agent: {}", config.site.user_agent);

    println!("\nOutput:");
    println!("  JSON: {}", config.output.json_path);
    if let Some(dir) = &config.output.debug_html_dir {
        println!("  Debug HTML: {}", dir);
    }

    let selected = select_categories(&known_category_urls(&config.site), &config.crawler.categories);
    println!("\nSelected Categories ({}):", selected.len());
    for (slug, url) in &selected {
        println!("  - {} ({})", slug, url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let fetcher = build_fetcher(&config)
        .await
        .context("failed to start the page fetcher")?;

    let (report, paths) = match run_crawl(config, fetcher).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Ok(());
        }
    };

    print_summary(&report, &paths.json, paths.csv.as_deref());
    Ok(())
}

#[cfg(feature = "browser")]
async fn build_fetcher(config: &Config) -> catalog_sweep::Result<Box<dyn PageFetcher>> {
    use catalog_sweep::crawler::ChromeFetcher;

    let fetcher = ChromeFetcher::launch(&config.crawler, &config.site).await?;
    Ok(Box::new(fetcher))
}

#[cfg(not(feature = "browser"))]
async fn build_fetcher(config: &Config) -> catalog_sweep::Result<Box<dyn PageFetcher>> {
    use catalog_sweep::crawler::HttpFetcher;

    if !config.crawler.headless {
        tracing::warn!("--no-headless has no effect without the browser feature");
    }
    let fetcher = HttpFetcher::new(&config.site)?;
    Ok(Box::new(fetcher))
}
