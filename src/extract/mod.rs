//! HTML extraction for listing and detail pages
//!
//! This module turns raw page HTML into data:
//! - Detail-page links from a listing page
//! - A full [`AdRecord`](crate::model::AdRecord) from a detail page
//!
//! Extraction never fails as a whole. A section that cannot be parsed is
//! logged at debug level and left at its defaults.

mod detail;
pub mod fields;
mod listing;

pub use detail::{
    extract_description, extract_images, extract_keywords, extract_views, parse_detail,
    resolve_title, ExtractRules,
};
pub use fields::{match_label, table_rows, Field, LabelRow, Section, TableFields};
pub use listing::extract_detail_links;

use scraper::{ElementRef, Selector};
use thiserror::Error;

/// Errors raised while reading page structure
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid selector '{0}'")]
    Selector(String),

    #[error("Invalid number '{0}'")]
    Number(String),

    #[error("Invalid link pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Compiles a CSS selector
pub(crate) fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css.to_string()))
}

/// Text of an element with each text node trimmed and empty ones dropped
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .concat()
}
