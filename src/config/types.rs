use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for Alba-Harvest
///
/// Every section and field has a default, so an empty TOML file (or no file
/// at all) yields a usable configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub site: SiteConfig,
    pub output: OutputConfig,
}

/// Request pacing, concurrency and retry behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScraperConfig {
    /// Base delay between listing pages and between batches (seconds)
    pub delay_secs: f64,

    /// Maximum number of detail fetches in flight at once
    pub max_concurrent: usize,

    /// Attempts per request before the last error is surfaced
    pub max_retries: u32,

    /// Hard timeout for a single request (seconds)
    pub timeout_secs: u64,

    /// Number of listing pages to walk
    pub max_pages: u32,

    /// Cap on the number of detail pages scraped
    pub max_ads: Option<usize>,

    /// Unit of the exponential backoff: attempt `n` waits `unit * 2^n`
    pub backoff_unit_ms: u64,

    /// Fixed wait after an HTTP 429 response
    pub rate_limit_cooldown_ms: u64,

    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            delay_secs: 1.5,
            max_concurrent: 5,
            max_retries: 3,
            timeout_secs: 30,
            max_pages: 5,
            max_ads: None,
            backoff_unit_ms: 1_000,
            rate_limit_cooldown_ms: 60_000,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Target site layout: endpoints, link patterns and page markers
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    pub base_url: String,

    /// Landing page fetched first to obtain a session cookie
    pub home_path: String,

    /// Adult-verification click-through
    pub age_gate_path: String,

    /// Credential POST target
    pub login_path: String,

    /// Paginated listing; also the protected page probed after login
    pub listing_path: String,

    /// Regex an anchor href must match to count as a detail page
    pub detail_link_pattern: String,

    pub username_field: String,
    pub password_field: String,

    /// Path fragment every ad image URL carries
    pub image_marker: String,

    /// Titles containing this are site chrome, not the ad title
    pub brand_name: String,

    /// Body substring of the age-gate redirect
    pub age_gate_marker: String,

    /// Client-side redirect script served to expired sessions
    pub redirect_marker: String,

    /// Case-insensitive substring of the login page
    pub login_marker: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://queenalba.net".to_string(),
            home_path: "/".to_string(),
            age_gate_path: "/adult_index.php".to_string(),
            login_path: "/member/login_ok.php".to_string(),
            listing_path: "/guin_list.php".to_string(),
            detail_link_pattern: r"guin_detail\.php\?num=\d+".to_string(),
            username_field: "mb_id".to_string(),
            password_field: "mb_password".to_string(),
            image_marker: "wys2/file_attach".to_string(),
            brand_name: "퀸알바".to_string(),
            age_gate_marker: "adult_index".to_string(),
            redirect_marker: "document.location.replace".to_string(),
            login_marker: "login".to_string(),
        }
    }
}

impl SiteConfig {
    /// Absolute URL of a site path
    ///
    /// ```
    /// use alba_harvest::config::SiteConfig;
    ///
    /// let site = SiteConfig::default();
    /// assert_eq!(site.endpoint("/adult_index.php"), "https://queenalba.net/adult_index.php");
    /// ```
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.is_empty() {
            return base.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// URL of listing page `page` (1-based)
    pub fn listing_page_url(&self, page: u32) -> String {
        format!("{}?page={}", self.endpoint(&self.listing_path), page)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Destination file for the scraped records
    pub path: PathBuf,

    pub format: OutputFormat,

    /// JSON ledger of URLs scraped by earlier runs; those are skipped
    pub collected_urls: Option<PathBuf>,

    /// Rewrite the output file every time this many new records arrive
    pub checkpoint_every: Option<usize>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./output/scraped_ads.json"),
            format: OutputFormat::Json,
            collected_urls: None,
            checkpoint_every: None,
        }
    }
}
