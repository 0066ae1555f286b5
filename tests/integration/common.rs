//! Shared fixtures: configuration, canned pages and wiremock helpers

use alba_harvest::config::Config;
use alba_harvest::Credentials;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, Respond, ResponseTemplate};

/// Configuration pointed at the mock server, with millisecond delays
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.scraper.delay_secs = 0.0;
    config.scraper.max_concurrent = 2;
    config.scraper.max_retries = 3;
    config.scraper.timeout_secs = 5;
    config.scraper.max_pages = 1;
    config.scraper.backoff_unit_ms = 1;
    config.scraper.rate_limit_cooldown_ms = 5;
    config
}

pub fn credentials() -> Credentials {
    Credentials::new("tester", "secret1")
}

/// Matches requests without a query string
pub struct NoQuery;

impl Match for NoQuery {
    fn matches(&self, request: &Request) -> bool {
        request.url.query().is_none()
    }
}

/// Fails with `status` for the first `failures` calls, then succeeds
pub struct Flaky {
    pub failures: usize,
    pub status: u16,
    pub body: String,
    pub calls: Arc<AtomicUsize>,
}

impl Flaky {
    pub fn new(failures: usize, status: u16, body: &str) -> Self {
        Self {
            failures,
            status,
            body: body.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Respond for Flaky {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            ResponseTemplate::new(self.status)
        } else {
            ResponseTemplate::new(200).set_body_string(self.body.clone())
        }
    }
}

pub fn html_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body.to_string())
}

/// Listing page linking to the given ad ids, plus two unrelated anchors
pub fn listing_html(ids: &[u64]) -> String {
    let mut html = String::from("<html><body><a href=\"/notice.php?id=1\">공지</a>");
    for id in ids {
        html.push_str(&format!(
            "<a href=\"guin_detail.php?num={}\">광고 {}</a>",
            id, id
        ));
    }
    html.push_str("<a href=\"/board.php?bo=free\">게시판</a></body></html>");
    html
}

pub fn detail_html(id: u64, nickname: &str) -> String {
    format!(
        r#"<html><body>
        <h1>퀸알바</h1>
        <h2>광고 {id}</h2>
        <table>
            <tr><th>닉네임</th><td>{nickname}</td></tr>
            <tr><th>근무지역</th><td>서울 강남구</td></tr>
            <tr><th>급여</th><td>일급 200,000원</td></tr>
        </table>
        <p>조회수 1,234</p>
        <img src="/wys2/file_attach/{id}.jpg">
        </body></html>"#
    )
}

pub const EXPIRED_HTML: &str =
    r#"<script>document.location.replace("/adult_index.php");</script>"#;

/// Mounts a login sequence that succeeds
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response("<html>home</html>"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/adult_index.php"))
        .respond_with(html_response("<html>adult check</html>"))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/member/login_ok.php"))
        .respond_with(html_response("<html>ok</html>"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/guin_list.php"))
        .and(NoQuery)
        .respond_with(html_response("<html>채용정보 목록</html>"))
        .mount(server)
        .await;
}

pub async fn mount_listing_page(server: &MockServer, page: u32, ids: &[u64]) {
    Mock::given(method("GET"))
        .and(path("/guin_list.php"))
        .and(query_param("page", page.to_string()))
        .respond_with(html_response(&listing_html(ids)))
        .mount(server)
        .await;
}

pub async fn mount_detail(server: &MockServer, id: u64, body: &str) {
    Mock::given(method("GET"))
        .and(path("/guin_detail.php"))
        .and(query_param("num", id.to_string()))
        .respond_with(html_response(body))
        .mount(server)
        .await;
}

/// Requests the server received for `path` (query ignored)
pub async fn requests_to(server: &MockServer, path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == path)
        .collect()
}

/// Requests for one detail page
pub async fn detail_requests(server: &MockServer, id: u64) -> usize {
    let num = format!("num={}", id);
    requests_to(server, "/guin_detail.php")
        .await
        .iter()
        .filter(|r| r.url.query() == Some(num.as_str()))
        .count()
}
