//! End-of-run statistics
//!
//! A [`RunSummary`] is assembled by the coordinator as the run progresses
//! and reported once at the end.

use std::path::PathBuf;
use std::time::Duration;

/// Counters describing one scraping run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Unique detail URLs found on the listing pages
    pub discovered: usize,

    /// URLs removed because the ledger already had them
    pub skipped_collected: usize,

    /// URLs a detail fetch was started for
    pub attempted: usize,

    /// Records produced
    pub scraped: usize,

    /// URLs whose fetch or parse failed recoverably
    pub dropped: usize,

    /// URLs never attempted because the run was aborted
    pub not_attempted: usize,

    /// True if session expiry stopped the run early
    pub aborted: bool,

    /// Where the records were written, if anywhere
    pub output_path: Option<PathBuf>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scraped records as a percentage of attempted URLs
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        (self.scraped as f64 / self.attempted as f64) * 100.0
    }

    /// Logs the summary at info level (warn if the run was aborted)
    pub fn log(&self) {
        tracing::info!(
            "Run finished in {:.1}s: {} discovered, {} already collected, {} attempted",
            self.elapsed.as_secs_f64(),
            self.discovered,
            self.skipped_collected,
            self.attempted
        );
        tracing::info!(
            "Scraped {}/{} ads ({:.1}%), {} dropped",
            self.scraped,
            self.attempted,
            self.success_rate(),
            self.dropped
        );
        if self.aborted {
            tracing::warn!(
                "Run aborted by session expiry; {} URLs were not attempted",
                self.not_attempted
            );
        }
        match &self.output_path {
            Some(path) => tracing::info!("Output written to {}", path.display()),
            None => tracing::info!("No output file written"),
        }
    }
}

/// Prints a summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Scrape Summary ===\n");
    println!("  Discovered:        {}", summary.discovered);
    println!("  Already collected: {}", summary.skipped_collected);
    println!("  Attempted:         {}", summary.attempted);
    println!(
        "  Scraped:           {} ({:.1}%)",
        summary.scraped,
        summary.success_rate()
    );
    println!("  Dropped:           {}", summary.dropped);
    if summary.aborted {
        println!("  Not attempted:     {} (session expired)", summary.not_attempted);
    }
    if let Some(path) = &summary.output_path {
        println!("  Output:            {}", path.display());
    }
}
