//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building the cookie-carrying HTTP client
//! - GET and form-POST requests
//! - Retry logic with exponential backoff and a fixed 429 cooldown
//! - Error classification

use crate::config::{ScraperConfig, SiteConfig};
use crate::{Result, ScraperError};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;

/// How failed requests are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per request, first one included
    pub max_retries: u32,

    /// Attempt `n` failing waits `backoff_unit * 2^n` before attempt `n + 1`
    pub backoff_unit: Duration,

    /// Fixed wait after an HTTP 429, instead of the backoff
    pub rate_limit_cooldown: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            max_retries: config.max_retries.max(1),
            backoff_unit: Duration::from_millis(config.backoff_unit_ms),
            rate_limit_cooldown: Duration::from_millis(config.rate_limit_cooldown_ms),
        }
    }

    /// Backoff after the given (1-based) failed attempt
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_unit.saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }

    /// Wait before the next attempt, given the error the last one produced
    pub fn delay_after(&self, error: &ScraperError, attempt: u32) -> Duration {
        match error {
            ScraperError::RateLimited { .. } => self.rate_limit_cooldown,
            _ => self.backoff_for(attempt),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ScraperConfig::default())
    }
}

/// Builds the HTTP client shared by every request of a run
///
/// The client keeps cookies between requests (the login session lives in
/// them), applies the per-request timeout and sends browser-like headers.
///
/// # Example
///
/// ```no_run
/// use alba_harvest::config::{ScraperConfig, SiteConfig};
/// use alba_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&ScraperConfig::default(), &SiteConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    config: &ScraperConfig,
    site: &SiteConfig,
) -> std::result::Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    if let Ok(referer) = HeaderValue::from_str(&site.base_url) {
        headers.insert(header::REFERER, referer);
    }

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetch layer with retry/backoff
///
/// The fetcher itself does not limit concurrency; callers that fan out
/// hold a scheduler permit around each call.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Builds a fetcher with a fresh client from configuration
    pub fn from_config(config: &ScraperConfig, site: &SiteConfig) -> Result<Self> {
        let client = build_http_client(config, site)?;
        Ok(Self::new(client, RetryPolicy::from_config(config)))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GETs `url` and returns the body text
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 429 | Wait the fixed cooldown, retry |
    /// | HTTP >= 400 | Wait `unit * 2^attempt`, retry |
    /// | Timeout / connection error | Wait `unit * 2^attempt`, retry |
    ///
    /// After `max_retries` attempts the last error is returned; a final
    /// 429 is reported as a network error with status 429.
    pub async fn get(&self, url: &str) -> Result<String> {
        self.with_retry(url, || self.client.get(url)).await
    }

    /// POSTs an url-encoded form to `url` and returns the body text
    ///
    /// Retried exactly like [`Fetcher::get`].
    pub async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String> {
        self.with_retry(url, || self.client.post(url).form(form)).await
    }

    async fn with_retry<F>(&self, url: &str, build: F) -> Result<String>
    where
        F: Fn() -> RequestBuilder,
    {
        let max = self.policy.max_retries.max(1);
        let mut attempt = 1;

        loop {
            match send_once(build(), url).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    tracing::warn!("Attempt {}/{} failed for {}: {}", attempt, max, url, err);

                    if attempt >= max {
                        return Err(exhausted(err));
                    }

                    let wait = self.policy.delay_after(&err, attempt);
                    if matches!(err, ScraperError::RateLimited { .. }) {
                        tracing::warn!("Rate limited on {}, waiting {:?}", url, wait);
                    }
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Sends one request and classifies the outcome
async fn send_once(request: RequestBuilder, url: &str) -> Result<String> {
    let response = request.send().await.map_err(|e| transport_error(url, &e))?;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        return Err(ScraperError::RateLimited {
            url: url.to_string(),
            retry_after,
        });
    }

    if status.is_client_error() || status.is_server_error() {
        return Err(ScraperError::Network {
            url: url.to_string(),
            status: Some(status.as_u16()),
            message: format!("HTTP {}", status.as_u16()),
        });
    }

    response.text().await.map_err(|e| transport_error(url, &e))
}

fn transport_error(url: &str, error: &reqwest::Error) -> ScraperError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection failed".to_string()
    } else {
        error.to_string()
    };

    ScraperError::Network {
        url: url.to_string(),
        status: None,
        message,
    }
}

/// Converts the last error of an exhausted retry loop for the caller
fn exhausted(error: ScraperError) -> ScraperError {
    match error {
        ScraperError::RateLimited { url, .. } => ScraperError::Network {
            url,
            status: Some(429),
            message: "Rate limited; retries exhausted".to_string(),
        },
        other => other,
    }
}
