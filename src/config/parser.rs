use crate::config::types::Config;
use crate::config::validation::validate;
use crate::output::OutputFormat;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable names understood by [`apply_env_overrides`]
pub const ENV_DELAY: &str = "SCRAPER_DELAY";
pub const ENV_MAX_CONCURRENT: &str = "SCRAPER_MAX_CONCURRENT";
pub const ENV_MAX_RETRIES: &str = "SCRAPER_MAX_RETRIES";
pub const ENV_TIMEOUT: &str = "SCRAPER_TIMEOUT";
pub const ENV_MAX_PAGES: &str = "SCRAPER_MAX_PAGES";
pub const ENV_OUTPUT_DIR: &str = "SCRAPER_OUTPUT_DIR";
pub const ENV_FORMAT: &str = "SCRAPER_FORMAT";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use alba_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Max pages: {}", config.scraper.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so two runs can be told apart by their settings.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Overlays `SCRAPER_*` variables from the process environment
pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    apply_overrides_from(config, |key| std::env::var(key).ok())
}

/// Overlays `SCRAPER_*` values obtained from `lookup`
///
/// Unset keys leave the config untouched; set but unparsable keys are an
/// error rather than being silently ignored.
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(delay) = parse_var::<f64, _>(&lookup, ENV_DELAY)? {
        config.scraper.delay_secs = delay;
    }
    if let Some(concurrent) = parse_var(&lookup, ENV_MAX_CONCURRENT)? {
        config.scraper.max_concurrent = concurrent;
    }
    if let Some(retries) = parse_var(&lookup, ENV_MAX_RETRIES)? {
        config.scraper.max_retries = retries;
    }
    if let Some(timeout) = parse_var(&lookup, ENV_TIMEOUT)? {
        config.scraper.timeout_secs = timeout;
    }
    if let Some(pages) = parse_var(&lookup, ENV_MAX_PAGES)? {
        config.scraper.max_pages = pages;
    }
    if let Some(format) = parse_var::<OutputFormat, _>(&lookup, ENV_FORMAT)? {
        config.output.format = format;
    }
    if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|d| !d.trim().is_empty()) {
        config.output.path = default_output_file(Path::new(&dir), config.output.format);
    }
    Ok(())
}

/// The conventional output file inside `dir` for the given format
pub fn default_output_file(dir: &Path, format: OutputFormat) -> PathBuf {
    dir.join(format!("scraped_ads.{}", format.extension()))
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                key: key.to_string(),
                value: raw,
            }),
    }
}
