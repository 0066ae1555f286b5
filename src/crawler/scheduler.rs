//! Scheduler for bounded-concurrency detail scraping
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - Splitting the URL list into batches of `2 * max_concurrent`
//! - Jittered pauses between batches
//! - Classifying results in dispatch order and stopping on fatal errors

use crate::model::AdRecord;
use crate::{Result, ScraperError, Severity};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Randomized delay between requests
///
/// Each pause lasts `base * f` with `f` drawn uniformly from `[0.5, 1.5)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pacing {
    base: Duration,
}

impl Pacing {
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Pacing from a delay in (possibly fractional) seconds
    ///
    /// Negative, non-finite and unrepresentable values mean no delay.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self::new(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO))
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    /// Draws one jittered delay
    pub fn jittered(&self) -> Duration {
        let secs = self.base.as_secs_f64() * (0.5 + fastrand::f64());
        Duration::try_from_secs_f64(secs).unwrap_or(self.base)
    }

    /// Sleeps for one jittered delay
    pub async fn pause(&self) {
        if self.base.is_zero() {
            return;
        }
        tokio::time::sleep(self.jittered()).await;
    }
}

/// Something that turns one detail URL into a record
///
/// A recoverable error means "no record for this URL"; a fatal one
/// (session expiry) stops the whole scrape.
#[async_trait]
pub trait DetailScraper: Send + Sync {
    async fn scrape_ad(&self, url: &str) -> Result<AdRecord>;
}

/// What a call to [`Scheduler::scrape_all`] produced
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    /// Records in dispatch order
    pub records: Vec<AdRecord>,

    /// URLs a scrape was started for
    pub attempted: usize,

    /// URLs that failed recoverably
    pub dropped: usize,

    /// URLs never started because the run was halted
    pub not_attempted: usize,

    /// True if a fatal error ended the scrape early
    pub aborted: bool,
}

/// Bounded-concurrency batch scheduler
///
/// At most `max_concurrent` scrapes are in flight at any moment. Batches run
/// one after another; within a batch, results are classified in the order
/// the URLs were dispatched, not the order they completed.
#[derive(Debug)]
pub struct Scheduler {
    max_concurrent: usize,
    semaphore: Arc<Semaphore>,
    pacing: Pacing,
}

impl Scheduler {
    /// Creates a scheduler; `max_concurrent` is clamped to at least 1
    pub fn new(max_concurrent: usize, pacing: Pacing) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            max_concurrent,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            pacing,
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Number of URLs dispatched together
    pub fn batch_size(&self) -> usize {
        self.max_concurrent * 2
    }

    /// Scrapes every URL
    ///
    /// See [`Scheduler::scrape_all_with`].
    pub async fn scrape_all<S>(&self, scraper: &S, urls: &[String]) -> ScrapeOutcome
    where
        S: DetailScraper + ?Sized,
    {
        self.scrape_all_with(scraper, urls, |_| {}).await
    }

    /// Scrapes every URL, calling `on_batch` with all records so far after
    /// each completed batch
    ///
    /// # Result Classification
    ///
    /// | Result | Action |
    /// |--------|--------|
    /// | `Ok(record)` | Appended in dispatch position |
    /// | Recoverable error | Logged, URL dropped |
    /// | Fatal error | Logged, scrape stops; records before it are kept |
    ///
    /// Once a fatal error is seen, scrapes still waiting for a permit are
    /// not started, and no further batches run.
    pub async fn scrape_all_with<S, F>(
        &self,
        scraper: &S,
        urls: &[String],
        mut on_batch: F,
    ) -> ScrapeOutcome
    where
        S: DetailScraper + ?Sized,
        F: FnMut(&[AdRecord]),
    {
        let mut outcome = ScrapeOutcome::default();
        if urls.is_empty() {
            return outcome;
        }

        tracing::info!("Starting to scrape {} ads...", urls.len());

        let halted = AtomicBool::new(false);
        let attempted = AtomicUsize::new(0);
        let batch_size = self.batch_size();
        let batch_count = urls.len().div_ceil(batch_size);

        for (index, batch) in urls.chunks(batch_size).enumerate() {
            tracing::debug!(
                "Dispatching batch {}/{} ({} URLs)",
                index + 1,
                batch_count,
                batch.len()
            );

            let tasks = batch.iter().map(|url| {
                let halted = &halted;
                let attempted = &attempted;
                async move {
                    let _permit = self.semaphore.acquire().await.ok()?;
                    if halted.load(Ordering::SeqCst) {
                        return None;
                    }
                    attempted.fetch_add(1, Ordering::SeqCst);

                    let result = scraper.scrape_ad(url).await;
                    if matches!(&result, Err(e) if e.is_fatal()) {
                        halted.store(true, Ordering::SeqCst);
                    }
                    Some(result)
                }
            });
            let results = join_all(tasks).await;

            for (url, result) in batch.iter().zip(results) {
                match result {
                    Some(Ok(record)) => outcome.records.push(record),
                    Some(Err(e)) => match e.severity() {
                        Severity::Fatal => {
                            log_fatal(url, &e);
                            outcome.aborted = true;
                            break;
                        }
                        Severity::Recoverable => {
                            tracing::debug!("Task failed for {}: {}", url, e);
                            outcome.dropped += 1;
                        }
                    },
                    None => {}
                }
            }

            if outcome.aborted {
                break;
            }

            on_batch(&outcome.records);

            if (index + 1) * batch_size < urls.len() {
                self.pacing.pause().await;
            }
        }

        outcome.attempted = attempted.load(Ordering::SeqCst);
        outcome.not_attempted = urls.len() - outcome.attempted;

        if !outcome.aborted {
            tracing::info!("Successfully scraped {} ads", outcome.records.len());
        }
        outcome
    }
}

fn log_fatal(url: &str, error: &ScraperError) {
    match error {
        ScraperError::SessionExpired(_) => {
            tracing::error!("Session expired at {}. Stopping scrape.", url)
        }
        other => tracing::error!("Fatal error at {}: {}. Stopping scrape.", url, other),
    }
}
