//! Ledger of detail URLs collected by earlier runs
//!
//! The ledger is a JSON array of URL strings. Loading a missing file yields
//! an empty ledger so the first run needs no setup.

use crate::output::traits::OutputResult;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Previously scraped detail URLs, persisted between runs
#[derive(Debug, Clone, Default)]
pub struct CollectedUrls {
    path: PathBuf,
    urls: Vec<String>,
    index: HashSet<String>,
}

impl CollectedUrls {
    /// Loads the ledger at `path`, or starts an empty one if it does not exist
    pub fn load(path: impl Into<PathBuf>) -> OutputResult<Self> {
        let path = path.into();
        let urls: Vec<String> = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Vec::new()
        };

        let mut ledger = Self {
            path,
            urls: Vec::new(),
            index: HashSet::new(),
        };
        ledger.extend(urls);
        Ok(ledger)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains(url)
    }

    /// Removes already-collected URLs, keeping the order of the rest
    ///
    /// # Returns
    ///
    /// The new URLs and the number skipped
    pub fn filter_new(&self, urls: Vec<String>) -> (Vec<String>, usize) {
        let before = urls.len();
        let fresh: Vec<String> = urls.into_iter().filter(|u| !self.contains(u)).collect();
        let skipped = before - fresh.len();
        (fresh, skipped)
    }

    /// Adds URLs not yet present, in order
    pub fn extend<I>(&mut self, urls: I)
    where
        I: IntoIterator<Item = String>,
    {
        for url in urls {
            if self.index.insert(url.clone()) {
                self.urls.push(url);
            }
        }
    }

    /// Writes the ledger back to its file, creating parent directories
    pub fn save(&self) -> OutputResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.urls)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
