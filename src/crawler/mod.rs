//! Crawler module for authenticated page fetching and scraping
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching with retry/backoff
//! - The login session and its expiry detection
//! - Listing-page URL discovery
//! - Bounded-concurrency batch scheduling
//! - Overall run coordination

mod client;
mod coordinator;
mod fetcher;
mod listing;
mod scheduler;
mod session;

pub use client::SiteClient;
pub use coordinator::{run_scrape, Coordinator};
pub use fetcher::{build_http_client, Fetcher, RetryPolicy};
pub use listing::collect_ad_urls;
pub use scheduler::{DetailScraper, Pacing, ScrapeOutcome, Scheduler};
pub use session::{SessionManager, SessionProbe};
