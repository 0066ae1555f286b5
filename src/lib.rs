//! Alba-Harvest: an authenticated job-ad scraper
//!
//! This crate logs into a single job-ad site, walks its paginated listing,
//! and extracts every linked detail page into structured [`AdRecord`]s with
//! bounded concurrency, retry/backoff and session-expiry detection.

pub mod config;
pub mod crawler;
pub mod credentials;
pub mod extract;
pub mod model;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Alba-Harvest operations
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP status >= 400 or a transport failure (status is `None` then)
    #[error("Network error for {url}: {message}")]
    Network {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Rate limited on {url}")]
    RateLimited {
        url: String,
        retry_after: Option<u64>,
    },

    #[error("Login failed: {0}")]
    Login(String),

    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("Parse error: {0}")]
    Parse(#[from] extract::ParseError),

    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition {
        from: state::SessionState,
        to: state::SessionState,
    },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How far an error is allowed to travel
///
/// Recoverable errors cost one page or one ad; fatal errors end the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Recoverable,
    Fatal,
}

impl ScraperError {
    /// Classifies this error for the listing crawler and the scheduler
    pub fn severity(&self) -> Severity {
        match self {
            Self::Login(_)
            | Self::SessionExpired(_)
            | Self::Config(_)
            | Self::InvalidTransition { .. } => Severity::Fatal,
            _ => Severity::Recoverable,
        }
    }

    /// Returns true if this error must stop the whole run
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => *status,
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid value '{value}' for {key}")]
    InvalidEnv { key: String, value: String },
}

/// Result type alias for Alba-Harvest operations
pub type Result<T> = std::result::Result<T, ScraperError>;

// Re-export commonly used types
pub use config::Config;
pub use credentials::Credentials;
pub use model::{AdRecord, AdvertiserInfo, CompanyInfo, RecruitmentInfo};
pub use state::SessionState;
