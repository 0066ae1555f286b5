//! Configuration module for Alba-Harvest
//!
//! Settings come from three layers, later ones winning: built-in defaults
//! (optionally replaced by a TOML file), `SCRAPER_*` environment variables,
//! and command-line flags applied by the binary.
//!
//! # Example
//!
//! ```no_run
//! use alba_harvest::config::{apply_env_overrides, load_config};
//! use std::path::Path;
//!
//! let mut config = load_config(Path::new("harvest.toml")).unwrap();
//! apply_env_overrides(&mut config).unwrap();
//! println!("Scraping {} listing pages", config.scraper.max_pages);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, OutputConfig, ScraperConfig, SiteConfig};

pub use parser::{
    apply_env_overrides, apply_overrides_from, compute_config_hash, default_output_file,
    load_config, load_config_with_hash, ENV_DELAY, ENV_FORMAT, ENV_MAX_CONCURRENT,
    ENV_MAX_PAGES, ENV_MAX_RETRIES, ENV_OUTPUT_DIR, ENV_TIMEOUT,
};
pub use validation::{validate, MAX_DELAY_SECS};
