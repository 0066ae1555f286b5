use crate::config::types::{Config, OutputConfig, ScraperConfig, SiteConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Longest accepted pause between requests, in seconds
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates pacing, concurrency and retry settings
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.max_concurrent < 1 || config.max_concurrent > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent must be between 1 and 100, got {}",
            config.max_concurrent
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(
            "max_retries must be >= 1".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if !config.delay_secs.is_finite()
        || config.delay_secs < 0.0
        || config.delay_secs > MAX_DELAY_SECS
    {
        return Err(ConfigError::Validation(format!(
            "delay_secs must be between 0 and {}, got {}",
            MAX_DELAY_SECS, config.delay_secs
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1".to_string(),
        ));
    }

    if config.max_ads == Some(0) {
        return Err(ConfigError::Validation(
            "max_ads must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the site layout
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            config.base_url
        )));
    }

    Regex::new(&config.detail_link_pattern).map_err(|e| {
        ConfigError::Validation(format!("Invalid detail_link_pattern: {}", e))
    })?;

    for (name, value) in [
        ("listing_path", &config.listing_path),
        ("login_path", &config.login_path),
        ("username_field", &config.username_field),
        ("password_field", &config.password_field),
        ("image_marker", &config.image_marker),
        ("age_gate_marker", &config.age_gate_marker),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{} cannot be empty",
                name
            )));
        }
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    if config.checkpoint_every == Some(0) {
        return Err(ConfigError::Validation(
            "checkpoint_every must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}
