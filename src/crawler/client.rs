//! Authenticated client for the target site
//!
//! [`SiteClient`] bundles what every site request needs: the fetch layer
//! (whose cookie jar holds the session), the session manager, and the
//! extraction rules. It is the [`DetailScraper`] the scheduler drives.

use crate::config::{Config, SiteConfig};
use crate::credentials::Credentials;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::listing::collect_ad_urls;
use crate::crawler::scheduler::{DetailScraper, Pacing};
use crate::crawler::session::{SessionManager, SessionProbe};
use crate::extract::{parse_detail, ExtractRules, ParseError};
use crate::model::AdRecord;
use crate::state::SessionState;
use crate::url::ad_id_from_url;
use crate::Result;
use async_trait::async_trait;
use regex::Regex;

/// Site operations that need a logged-in session
#[derive(Debug)]
pub struct SiteClient {
    fetcher: Fetcher,
    session: SessionManager,
    site: SiteConfig,
    rules: ExtractRules,
    detail_pattern: Regex,
    pacing: Pacing,
}

impl SiteClient {
    /// Builds a client with a fresh HTTP client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = Fetcher::from_config(&config.scraper, &config.site)?;
        let pacing = Pacing::from_secs_f64(config.scraper.delay_secs);
        Self::new(fetcher, config.site.clone(), pacing)
    }

    /// Builds a client around an existing fetcher
    pub fn new(fetcher: Fetcher, site: SiteConfig, pacing: Pacing) -> Result<Self> {
        let detail_pattern = Regex::new(&site.detail_link_pattern).map_err(ParseError::from)?;
        let rules = ExtractRules::from_site(&site)?;
        let session = SessionManager::new(SessionProbe::from_site(&site));

        Ok(Self {
            fetcher,
            session,
            site,
            rules,
            detail_pattern,
            pacing,
        })
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Logs in; see [`SessionManager::login`]
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.session
            .login(&self.fetcher, &self.site, credentials)
            .await
    }

    /// Collects detail URLs from the first `max_pages` listing pages
    ///
    /// # Errors
    ///
    /// `SessionExpired` if called before a successful login. Individual
    /// page failures are not errors; those pages are skipped.
    pub async fn get_ad_urls(&self, max_pages: u32) -> Result<Vec<String>> {
        self.session.ensure_authenticated()?;
        Ok(collect_ad_urls(
            &self.fetcher,
            &self.site,
            &self.detail_pattern,
            max_pages,
            &self.pacing,
        )
        .await)
    }
}

#[async_trait]
impl DetailScraper for SiteClient {
    /// Fetches and parses one detail page
    ///
    /// Network failures (after retries) are recoverable. A page carrying
    /// an expiry marker is `SessionExpired`, which is fatal.
    async fn scrape_ad(&self, url: &str) -> Result<AdRecord> {
        self.session.ensure_authenticated()?;

        let id = ad_id_from_url(url);
        tracing::info!("Scraping ad #{}", id);

        let html = match self.fetcher.get(url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Network error for {}: {}", url, e);
                return Err(e);
            }
        };

        self.session.check_detail(url, &html)?;

        let record = parse_detail(&html, url, &self.rules);
        tracing::info!("Scraped: {}", truncate_chars(&record.title, 50));
        Ok(record)
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
