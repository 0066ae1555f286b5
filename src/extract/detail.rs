//! Detail page parsing
//!
//! A detail page is read in independent passes: the label table, the view
//! counter, images, keywords, the description block and the title. A pass
//! that fails leaves its part of the record at the default value.

use crate::config::SiteConfig;
use crate::extract::fields::{table_rows, TableFields};
use crate::extract::{element_text, selector, ParseError};
use crate::model::{placeholder_title, AdRecord, AdvertiserInfo, DetailContent};
use crate::url::{ad_id_from_url, resolve_asset_url};
use crate::ScraperError;
use chrono::Utc;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use std::sync::OnceLock;
use url::Url;

/// Selectors tried, in order, for the ad title
const TITLE_SELECTORS: &[&str] = &["h1", "h2", ".title", ".tit"];

/// Keywords longer than this are prose, not tags
const MAX_KEYWORD_CHARS: usize = 30;

fn views_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"조회(?:수)?[:：\s]*(\d[\d,]*)").expect("static regex"))
}

fn description_heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"상세\s*채용\s*정보").expect("static regex"))
}

/// Site-specific inputs of detail extraction
#[derive(Debug, Clone)]
pub struct ExtractRules {
    /// Origin images are resolved against
    pub base: Url,

    /// Path fragment identifying ad images
    pub image_marker: String,

    /// Title candidates containing this are rejected
    pub brand_name: String,
}

impl ExtractRules {
    pub fn from_site(site: &SiteConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            base: Url::parse(&site.base_url)?,
            image_marker: site.image_marker.clone(),
            brand_name: site.brand_name.clone(),
        })
    }
}

/// Parses one detail page into a record
///
/// Session-expiry detection happens before this is called; by the time
/// HTML reaches here it is assumed to be a real detail page.
///
/// # Arguments
///
/// * `html` - The detail page HTML
/// * `url` - The URL it was fetched from (source of the ad id)
/// * `rules` - Site-specific extraction inputs
///
/// # Example
///
/// ```
/// use alba_harvest::config::SiteConfig;
/// use alba_harvest::extract::{parse_detail, ExtractRules};
///
/// let rules = ExtractRules::from_site(&SiteConfig::default()).unwrap();
/// let html = "<table><tr><td>닉네임</td><td>미라</td></tr></table>";
/// let record = parse_detail(html, "https://queenalba.net/guin_detail.php?num=7", &rules);
/// assert_eq!(record.id, 7);
/// assert_eq!(record.advertiser.nickname, "미라");
/// assert_eq!(record.title, "미라");
/// ```
pub fn parse_detail(html: &str, url: &str, rules: &ExtractRules) -> AdRecord {
    let id = ad_id_from_url(url);
    let document = Html::parse_document(html);

    let rows = table_rows(&document).unwrap_or_else(|e| {
        tracing::debug!("Error reading table rows for ad #{}: {}", id, e);
        Vec::new()
    });
    let mut fields = TableFields::from_rows(&rows);

    let page_text: String = document.root_element().text().collect();
    match extract_views(&page_text) {
        Ok(Some(views)) => fields.advertiser.views = views,
        Ok(None) => {}
        Err(e) => tracing::debug!("Error parsing view count for ad #{}: {}", id, e),
    }

    match extract_keywords(&document) {
        Ok(keywords) => fields.recruitment.keywords = keywords,
        Err(e) => tracing::debug!("Error parsing keywords for ad #{}: {}", id, e),
    }

    let images = extract_images(&document, rules).unwrap_or_else(|e| {
        tracing::debug!("Error extracting images for ad #{}: {}", id, e);
        Vec::new()
    });

    let description = extract_description(&document).unwrap_or_else(|e| {
        tracing::debug!("Error parsing description for ad #{}: {}", id, e);
        String::new()
    });

    let title = resolve_title(&document, &rules.brand_name, &fields.advertiser, id);

    AdRecord {
        id,
        url: url.to_string(),
        title,
        scraped_at: Utc::now(),
        advertiser: fields.advertiser,
        recruitment: fields.recruitment,
        detail: DetailContent {
            description,
            images,
        },
        company: fields.company,
    }
}

/// Finds the view counter ("조회 1,234" / "조회수: 1,234") in page text
///
/// # Returns
///
/// * `Ok(Some(n))` - Counter found
/// * `Ok(None)` - No counter on the page
/// * `Err(ParseError::Number)` - Counter does not fit in a `u64`
pub fn extract_views(page_text: &str) -> Result<Option<u64>, ParseError> {
    let Some(digits) = views_regex().captures(page_text).and_then(|c| c.get(1)) else {
        return Ok(None);
    };

    let cleaned = digits.as_str().replace(',', "");
    cleaned
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ParseError::Number(digits.as_str().to_string()))
}

/// Collects ad images, absolute and deduplicated, in page order
///
/// Only `<img>` elements whose `src` (or `data-src` when `src` is empty)
/// contains the image marker are considered.
pub fn extract_images(document: &Html, rules: &ExtractRules) -> Result<Vec<String>, ParseError> {
    let img_selector = selector("img")?;
    let mut seen = HashSet::new();
    let mut images = Vec::new();

    for img in document.select(&img_selector) {
        let attrs = img.value();
        let src = attrs
            .attr("src")
            .filter(|s| !s.trim().is_empty())
            .or_else(|| attrs.attr("data-src"))
            .unwrap_or("");

        if src.is_empty() || !src.contains(&rules.image_marker) {
            continue;
        }

        let absolute = resolve_asset_url(src, &rules.base);
        if seen.insert(absolute.clone()) {
            images.push(absolute);
        }
    }

    Ok(images)
}

/// Collects short tag-like labels from `span`/`a` elements
///
/// An element qualifies when its class contains `tag`, `keyword` or
/// `label` (any case) and its text is non-empty and under 30 characters.
pub fn extract_keywords(document: &Html) -> Result<Vec<String>, ParseError> {
    let tag_selector = selector("span[class], a[class]")?;
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    for element in document.select(&tag_selector) {
        let class = element.value().attr("class").unwrap_or("").to_lowercase();
        if !["tag", "keyword", "label"].iter().any(|t| class.contains(t)) {
            continue;
        }

        let text = element_text(element);
        if text.is_empty() || text.chars().count() >= MAX_KEYWORD_CHARS {
            continue;
        }
        if seen.insert(text.clone()) {
            keywords.push(text);
        }
    }

    Ok(keywords)
}

/// Text of the "상세채용정보" block, one text node per line
///
/// The innermost `div`/`section`/`table` containing the heading is used.
/// When that element holds nothing but the heading, the nearest ancestor
/// with more text is used instead. Empty when the page has no such block.
pub fn extract_description(document: &Html) -> Result<String, ParseError> {
    let block_selector = selector("div, section, table")?;
    let heading = description_heading_regex();

    let innermost = document
        .select(&block_selector)
        .filter(|el| heading.is_match(&el.text().collect::<String>()))
        .min_by_key(|el| el.text().map(str::len).sum::<usize>());

    let Some(block) = innermost else {
        return Ok(String::new());
    };

    let chosen = std::iter::once(block)
        .chain(block.ancestors().filter_map(ElementRef::wrap))
        .find(|el| {
            let flat: String = el.text().collect();
            !heading.replace_all(&flat, "").trim().is_empty()
        })
        .unwrap_or(block);

    Ok(block_lines(chosen))
}

fn block_lines(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Picks the ad title; never returns an empty string
///
/// The first non-empty candidate from `h1`, `h2`, `.title`, `.tit` that does
/// not contain the site brand wins. Otherwise the advertiser nickname, then
/// the business name, then `Ad #<id>`.
pub fn resolve_title(
    document: &Html,
    brand_name: &str,
    advertiser: &AdvertiserInfo,
    id: u64,
) -> String {
    let from_page = TITLE_SELECTORS.iter().find_map(|css| {
        let sel = selector(css).ok()?;
        let text = element_text(document.select(&sel).next()?);
        let is_brand = !brand_name.is_empty() && text.contains(brand_name);
        (!text.is_empty() && !is_brand).then_some(text)
    });

    from_page
        .or_else(|| non_empty(&advertiser.nickname))
        .or_else(|| non_empty(&advertiser.business_name))
        .unwrap_or_else(|| placeholder_title(id))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
