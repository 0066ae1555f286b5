//! Alba-Harvest main entry point
//!
//! This is the command-line interface for the Alba-Harvest job-ad scraper.

use alba_harvest::config::{
    apply_env_overrides, load_config_with_hash, validate, Config, ScraperConfig,
};
use alba_harvest::credentials::{ENV_PASSWORD, ENV_USERNAME};
use alba_harvest::crawler::run_scrape;
use alba_harvest::output::{print_summary, OutputFormat};
use alba_harvest::{Credentials, ScraperError};
use anyhow::Context;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit status of a run cut short by session expiry
const EXIT_ABORTED: u8 = 2;

/// Alba-Harvest: an authenticated job-ad scraper
///
/// Logs into the site, walks the listing pages, scrapes every linked ad
/// with bounded concurrency and writes the records as JSON, JSONL or CSV.
#[derive(Parser, Debug)]
#[command(name = "alba-harvest")]
#[command(version = "1.0.0")]
#[command(about = "An authenticated job-ad scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Number of listing pages to scrape
    #[arg(long)]
    pages: Option<u32>,

    /// Maximum number of ads to scrape (default: all)
    #[arg(long)]
    max_ads: Option<usize>,

    /// Output file path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Maximum concurrent requests
    #[arg(short = 'c', long = "concurrent")]
    concurrent: Option<usize>,

    /// Delay between requests in seconds
    #[arg(short, long)]
    delay: Option<f64>,

    /// Number of attempts for failed requests
    #[arg(short = 'r', long = "retry")]
    retry: Option<u32>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Login username
    #[arg(short, long, env = ENV_USERNAME)]
    username: Option<String>,

    /// Login password
    #[arg(short, long, env = ENV_PASSWORD, hide_env_values = true)]
    password: Option<String>,

    /// JSON file of already collected URLs; those are skipped and new ones appended
    #[arg(long, value_name = "FILE")]
    collected: Option<PathBuf>,

    /// Rewrite the output file after every N new records
    #[arg(long, value_name = "N")]
    checkpoint_every: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Also write the log (without colors) to this file
    #[arg(long, env = "LOG_FILE", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Validate and print the effective configuration without scraping
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to set up logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Scraping failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber
///
/// `RUST_LOG` wins over the verbosity flags when set. With a log file, every
/// event is written both to the terminal and, uncolored, to the file.
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("alba_harvest=info,warn"),
                1 => EnvFilter::new("alba_harvest=debug,info"),
                2 => EnvFilter::new("alba_harvest=trace,debug"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .with(file_layer)
        .init();

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_env_overrides(&mut config).context("invalid environment override")?;
    apply_cli_overrides(&mut config, &cli);
    validate(&config).context("invalid configuration")?;

    if cli.dry_run {
        print_dry_run(&config, cli.username.is_some() && cli.password.is_some());
        return Ok(ExitCode::SUCCESS);
    }

    let credentials = match (cli.username, cli.password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            Credentials::new(username, password)
        }
        _ => {
            tracing::error!("No credentials provided.");
            tracing::error!(
                "Set {} and {} environment variables,",
                ENV_USERNAME,
                ENV_PASSWORD
            );
            tracing::error!("or use --username and --password arguments.");
            return Ok(ExitCode::FAILURE);
        }
    };

    tracing::info!("Alba-Harvest {}", env!("CARGO_PKG_VERSION"));
    log_settings(&config.scraper);

    match run_scrape(config, credentials).await {
        Ok(summary) => {
            if !cli.quiet {
                print_summary(&summary);
            }
            if summary.aborted {
                Ok(ExitCode::from(EXIT_ABORTED))
            } else {
                tracing::info!("Scraping complete!");
                Ok(ExitCode::SUCCESS)
            }
        }
        Err(ScraperError::Login(message)) => {
            tracing::error!("Login failed: {}", message);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

/// Applies command-line flags on top of file and environment settings
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    let scraper = &mut config.scraper;
    if let Some(pages) = cli.pages {
        scraper.max_pages = pages;
    }
    if let Some(max_ads) = cli.max_ads {
        scraper.max_ads = Some(max_ads);
    }
    if let Some(concurrent) = cli.concurrent {
        scraper.max_concurrent = concurrent;
    }
    if let Some(delay) = cli.delay {
        scraper.delay_secs = delay;
    }
    if let Some(retry) = cli.retry {
        scraper.max_retries = retry;
    }
    if let Some(timeout) = cli.timeout {
        scraper.timeout_secs = timeout;
    }

    let output = &mut config.output;
    if let Some(format) = cli.format {
        output.format = format;
        if cli.output.is_none() {
            output.path.set_extension(format.extension());
        }
    }
    if let Some(path) = &cli.output {
        output.path = path.clone();
    }
    if let Some(collected) = &cli.collected {
        output.collected_urls = Some(collected.clone());
    }
    if let Some(every) = cli.checkpoint_every {
        output.checkpoint_every = Some(every);
    }
}

fn log_settings(scraper: &ScraperConfig) {
    tracing::info!(
        "Pages: {}, concurrency: {}, delay: {:.1}s, retries: {}, timeout: {}s",
        scraper.max_pages,
        scraper.max_concurrent,
        scraper.delay_secs,
        scraper.max_retries,
        scraper.timeout_secs
    );
}

/// Handles the --dry-run mode: shows the effective configuration
fn print_dry_run(config: &Config, has_credentials: bool) {
    println!("=== Alba-Harvest Dry Run ===\n");

    println!("Scraper:");
    println!("  Listing pages: {}", config.scraper.max_pages);
    match config.scraper.max_ads {
        Some(max) => println!("  Max ads: {}", max),
        None => println!("  Max ads: all"),
    }
    println!("  Max concurrent: {}", config.scraper.max_concurrent);
    println!("  Delay: {:.2}s (jittered x0.5-1.5)", config.scraper.delay_secs);
    println!("  Retries: {}", config.scraper.max_retries);
    println!("  Timeout: {}s", config.scraper.timeout_secs);
    println!(
        "  Backoff unit: {}ms, 429 cooldown: {}ms",
        config.scraper.backoff_unit_ms, config.scraper.rate_limit_cooldown_ms
    );

    println!("\nSite:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Login: {}", config.site.endpoint(&config.site.login_path));
    println!("  Listing: {}", config.site.listing_page_url(1));
    println!("  Detail pattern: {}", config.site.detail_link_pattern);

    println!("\nOutput:");
    println!("  Path: {}", config.output.path.display());
    println!("  Format: {}", config.output.format);
    if let Some(ledger) = &config.output.collected_urls {
        println!("  Collected URLs: {}", ledger.display());
    }
    if let Some(every) = config.output.checkpoint_every {
        println!("  Checkpoint every: {} ads", every);
    }

    println!("\n✓ Configuration is valid");
    if has_credentials {
        println!("✓ Credentials provided");
    } else {
        println!(
            "✗ No credentials: set {} and {} or pass --username/--password",
            ENV_USERNAME, ENV_PASSWORD
        );
    }
}
