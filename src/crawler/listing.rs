//! Listing crawler: walks the paginated index and collects detail URLs

use crate::config::SiteConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::scheduler::Pacing;
use crate::extract::extract_detail_links;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Fetches listing pages `1..=max_pages` and returns unique detail URLs
///
/// URLs keep the order they were first seen in. A page that cannot be
/// fetched (after retries) or parsed is logged and skipped; the walk always
/// continues with the next page. A jittered pause separates pages.
///
/// # Arguments
///
/// * `fetcher` - Fetch layer carrying the logged-in session
/// * `site` - Listing endpoint
/// * `pattern` - Detail link pattern
/// * `max_pages` - Number of pages to walk
/// * `pacing` - Delay between pages
pub async fn collect_ad_urls(
    fetcher: &Fetcher,
    site: &SiteConfig,
    pattern: &Regex,
    max_pages: u32,
    pacing: &Pacing,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ad_urls = Vec::new();

    for page in 1..=max_pages {
        let list_url = site.listing_page_url(page);
        tracing::info!("Fetching listing page {}/{}", page, max_pages);

        match fetch_page_links(fetcher, &list_url, pattern).await {
            Ok(links) => {
                tracing::debug!("Found {} links on page {}", links.len(), page);
                for link in links {
                    if seen.insert(link.clone()) {
                        ad_urls.push(link);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Failed to fetch page {}: {}", page, e);
            }
        }

        if page < max_pages {
            pacing.pause().await;
        }
    }

    tracing::info!("Total unique ad URLs found: {}", ad_urls.len());
    ad_urls
}

async fn fetch_page_links(
    fetcher: &Fetcher,
    list_url: &str,
    pattern: &Regex,
) -> crate::Result<Vec<String>> {
    let html = fetcher.get(list_url).await?;
    let page_url = Url::parse(list_url)?;
    Ok(extract_detail_links(&html, &page_url, pattern)?)
}
