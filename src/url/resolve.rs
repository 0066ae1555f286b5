use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn ad_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"num=(\d+)").expect("static regex"))
}

/// Extracts the numeric ad id from a detail URL
///
/// A URL with no `num=<digits>` parameter (or one that overflows) yields 0;
/// such URLs are still scraped.
///
/// # Examples
///
/// ```
/// use alba_harvest::url::ad_id_from_url;
///
/// assert_eq!(ad_id_from_url("https://example.com/guin_detail.php?num=1234"), 1234);
/// assert_eq!(ad_id_from_url("https://example.com/guin_detail.php"), 0);
/// ```
pub fn ad_id_from_url(url: &str) -> u64 {
    ad_id_regex()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Returns `scheme://host[:port]` of a URL, without a trailing slash
pub fn origin_of(base: &Url) -> String {
    base.origin().ascii_serialization()
}

/// Makes an image `src` absolute against `base` and collapses `/../`
///
/// # Resolution Rules
///
/// | `src` form | Result |
/// |------------|--------|
/// | `//host/p` | base scheme + `:` + src |
/// | `/p` | origin + src |
/// | `http...` | unchanged |
/// | `p` | origin + `/` + src |
///
/// Every `/../` is then replaced with `/` (the segment is dropped, not
/// resolved against its parent).
pub fn resolve_asset_url(src: &str, base: &Url) -> String {
    let src = src.trim();
    let absolute = if src.starts_with("//") {
        format!("{}:{}", base.scheme(), src)
    } else if src.starts_with('/') {
        format!("{}{}", origin_of(base), src)
    } else if src.starts_with("http") {
        src.to_string()
    } else {
        format!("{}/{}", origin_of(base), src)
    };

    collapse_parent_segments(&absolute)
}

/// Replaces `/../` with `/` until none remain
pub fn collapse_parent_segments(url: &str) -> String {
    let mut collapsed = url.to_string();
    while collapsed.contains("/../") {
        collapsed = collapsed.replace("/../", "/");
    }
    collapsed
}
