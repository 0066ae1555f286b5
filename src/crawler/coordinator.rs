//! Scrape coordinator - main run orchestration logic
//!
//! This module contains the run pipeline that ties the pieces together:
//! - Logging in
//! - Discovering detail URLs from the listing pages
//! - Skipping URLs collected by earlier runs
//! - Scraping details through the scheduler, with optional checkpoints
//! - Writing the output file and updating the ledger

use crate::config::Config;
use crate::credentials::Credentials;
use crate::crawler::client::SiteClient;
use crate::crawler::scheduler::{Pacing, Scheduler};
use crate::model::AdRecord;
use crate::output::{save_output, CollectedUrls, RunSummary};
use crate::Result;
use std::time::Instant;

/// Main scrape coordinator structure
#[derive(Debug)]
pub struct Coordinator {
    config: Config,
    credentials: Credentials,
    client: SiteClient,
    scheduler: Scheduler,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - Validated scraper configuration
    /// * `credentials` - Account used for the login sequence
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Client and scheduler built
    /// * `Err(ScraperError)` - HTTP client or site rules could not be built
    pub fn new(config: Config, credentials: Credentials) -> Result<Self> {
        let client = SiteClient::from_config(&config)?;
        let scheduler = Scheduler::new(
            config.scraper.max_concurrent,
            Pacing::from_secs_f64(config.scraper.delay_secs),
        );

        Ok(Self {
            config,
            credentials,
            client,
            scheduler,
        })
    }

    pub fn client(&self) -> &SiteClient {
        &self.client
    }

    /// Runs the whole pipeline
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The run finished, possibly aborted by session
    ///   expiry (see `RunSummary::aborted`) or with nothing to scrape
    /// * `Err(ScraperError::Login)` - Login failed; nothing was written
    /// * `Err(ScraperError)` - The ledger could not be read
    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let mut summary = RunSummary::new();

        self.client.login(&self.credentials).await?;

        let discovered = self
            .client
            .get_ad_urls(self.config.scraper.max_pages)
            .await?;
        summary.discovered = discovered.len();

        if discovered.is_empty() {
            tracing::warn!("No ad URLs found.");
            return Ok(self.finish(summary, started));
        }

        let mut ledger = match &self.config.output.collected_urls {
            Some(path) => Some(CollectedUrls::load(path)?),
            None => None,
        };

        let mut urls = match &ledger {
            Some(ledger) => {
                let (fresh, skipped) = ledger.filter_new(discovered);
                summary.skipped_collected = skipped;
                if skipped > 0 {
                    tracing::info!("Skipping {} already collected ads", skipped);
                }
                fresh
            }
            None => discovered,
        };

        if let Some(max_ads) = self.config.scraper.max_ads {
            urls.truncate(max_ads);
        }

        if urls.is_empty() {
            tracing::warn!("No new ad URLs to scrape.");
            return Ok(self.finish(summary, started));
        }

        let mut checkpoint = Checkpoint::new(&self.config);
        let outcome = self
            .scheduler
            .scrape_all_with(&self.client, &urls, |records| checkpoint.maybe_save(records))
            .await;

        summary.attempted = outcome.attempted;
        summary.scraped = outcome.records.len();
        summary.dropped = outcome.dropped;
        summary.not_attempted = outcome.not_attempted;
        summary.aborted = outcome.aborted;

        if outcome.records.is_empty() {
            tracing::warn!("No ads were scraped successfully");
            return Ok(self.finish(summary, started));
        }

        let path = &self.config.output.path;
        save_output(&outcome.records, path, self.config.output.format)?;
        tracing::info!("Saved {} ads to {}", outcome.records.len(), path.display());
        summary.output_path = Some(path.clone());

        if let Some(ledger) = ledger.as_mut() {
            ledger.extend(outcome.records.iter().map(|r| r.url.clone()));
            match ledger.save() {
                Ok(()) => tracing::debug!(
                    "Ledger {} now holds {} URLs",
                    ledger.path().display(),
                    ledger.len()
                ),
                Err(e) => tracing::warn!(
                    "Failed to update ledger {}: {}",
                    ledger.path().display(),
                    e
                ),
            }
        }

        Ok(self.finish(summary, started))
    }

    fn finish(&self, mut summary: RunSummary, started: Instant) -> RunSummary {
        summary.elapsed = started.elapsed();
        summary.log();
        summary
    }
}

/// Periodic rewrite of the output file during long runs
struct Checkpoint<'a> {
    config: &'a Config,
    every: Option<usize>,
    last_saved: usize,
}

impl<'a> Checkpoint<'a> {
    fn new(config: &'a Config) -> Self {
        Self {
            config,
            every: config.output.checkpoint_every.filter(|n| *n > 0),
            last_saved: 0,
        }
    }

    fn maybe_save(&mut self, records: &[AdRecord]) {
        let Some(every) = self.every else {
            return;
        };
        if records.len() < self.last_saved + every {
            return;
        }

        let output = &self.config.output;
        match save_output(records, &output.path, output.format) {
            Ok(()) => {
                tracing::info!("Checkpoint: {} ads written", records.len());
                self.last_saved = records.len();
            }
            Err(e) => tracing::warn!("Checkpoint write failed: {}", e),
        }
    }
}

/// Runs a complete scrape with the given configuration
///
/// This is the main entry point for a run.
///
/// # Example
///
/// ```no_run
/// use alba_harvest::config::Config;
/// use alba_harvest::crawler::run_scrape;
/// use alba_harvest::Credentials;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = run_scrape(Config::default(), Credentials::new("user", "secret")).await?;
/// println!("{} ads scraped", summary.scraped);
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape(config: Config, credentials: Credentials) -> Result<RunSummary> {
    Coordinator::new(config, credentials)?.run().await
}
