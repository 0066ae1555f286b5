use crate::extract::{selector, ParseError};
use regex::Regex;
use scraper::Html;
use std::collections::HashSet;
use url::Url;

/// Extracts detail-page links from one listing page
///
/// Only `<a href>` values matching `pattern` are kept. Each is resolved
/// against `page_url`; the result is deduplicated in first-seen order, so
/// re-parsing the same HTML always yields the same list.
///
/// # Arguments
///
/// * `html` - The listing page HTML
/// * `page_url` - URL the page was fetched from
/// * `pattern` - Detail link pattern, e.g. `guin_detail\.php\?num=\d+`
pub fn extract_detail_links(
    html: &str,
    page_url: &Url,
    pattern: &Regex,
) -> Result<Vec<String>, ParseError> {
    let document = Html::parse_document(html);
    let anchor_selector = selector("a[href]")?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&anchor_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if !pattern.is_match(href) {
            continue;
        }

        match page_url.join(href) {
            Ok(absolute) => {
                let absolute = absolute.to_string();
                if seen.insert(absolute.clone()) {
                    links.push(absolute);
                }
            }
            Err(e) => tracing::debug!("Skipping unresolvable link {}: {}", href, e),
        }
    }

    Ok(links)
}
