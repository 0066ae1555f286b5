//! Login sequence and session-expiry detection against a mock site

use crate::common::{
    credentials, detail_html, html_response, mount_detail, mount_login, requests_to, test_config,
    NoQuery, EXPIRED_HTML,
};
use alba_harvest::crawler::{DetailScraper, SiteClient};
use alba_harvest::{Credentials, ScraperError, SessionState};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> SiteClient {
    SiteClient::from_config(&test_config(&server.uri())).unwrap()
}

#[tokio::test]
async fn test_login_success() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let client = client_for(&server);
    client.login(&credentials()).await.unwrap();

    assert_eq!(client.session_state(), SessionState::Authenticated);

    let paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(
        paths,
        vec!["/", "/adult_index.php", "/member/login_ok.php", "/guin_list.php"]
    );
}

#[tokio::test]
async fn test_login_rejected_when_probe_shows_login_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response("home"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/adult_index.php"))
        .respond_with(html_response("adult check"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/member/login_ok.php"))
        .respond_with(html_response("ok"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/guin_list.php"))
        .respond_with(html_response("<form action='/member/Login_ok.php'></form>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.login(&credentials()).await.unwrap_err();

    assert!(matches!(err, ScraperError::Login(_)));
    assert!(err.is_fatal());
    assert_eq!(client.session_state(), SessionState::LoginFailed);
}

#[tokio::test]
async fn test_invalid_credentials_rejected_before_any_request() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let client = client_for(&server);
    let err = client
        .login(&Credentials::new("ab", "secret1"))
        .await
        .unwrap_err();

    assert!(matches!(err, ScraperError::Login(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_network_failure_during_login_is_login_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.login(&credentials()).await.unwrap_err();

    match err {
        ScraperError::Login(message) => assert!(message.contains("network error")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(requests_to(&server, "/").await.len(), 3);
    assert!(requests_to(&server, "/adult_index.php").await.is_empty());
}

#[tokio::test]
async fn test_session_cookie_is_sent_after_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "PHPSESSID=abc123; Path=/")
                .set_body_string("home"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/adult_index.php"))
        .respond_with(html_response("adult check"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/member/login_ok.php"))
        .respond_with(html_response("ok"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/guin_list.php"))
        .and(NoQuery)
        .and(header("cookie", "PHPSESSID=abc123"))
        .respond_with(html_response("채용정보"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.login(&credentials()).await.unwrap();
    assert_eq!(client.session_state(), SessionState::Authenticated);
}

#[tokio::test]
async fn test_get_ad_urls_before_login_is_session_expired() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let err = client.get_ad_urls(1).await.unwrap_err();

    assert!(matches!(err, ScraperError::SessionExpired(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_detail_scrape_parses_record() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_detail(&server, 501, &detail_html(501, "미라")).await;

    let client = client_for(&server);
    client.login(&credentials()).await.unwrap();

    let url = format!("{}/guin_detail.php?num=501", server.uri());
    let record = client.scrape_ad(&url).await.unwrap();

    assert_eq!(record.id, 501);
    assert_eq!(record.title, "광고 501");
    assert_eq!(record.advertiser.nickname, "미라");
    assert_eq!(record.advertiser.views, 1234);
    assert_eq!(record.recruitment.salary, "200,000원");
    assert_eq!(
        record.thumbnail(),
        format!("{}/wys2/file_attach/501.jpg", server.uri())
    );
}

#[tokio::test]
async fn test_detail_expiry_marker_is_fatal() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_detail(&server, 7, EXPIRED_HTML).await;

    let client = client_for(&server);
    client.login(&credentials()).await.unwrap();

    let url = format!("{}/guin_detail.php?num=7", server.uri());
    let err = client.scrape_ad(&url).await.unwrap_err();

    assert!(matches!(err, ScraperError::SessionExpired(_)));
    assert!(err.is_fatal());
    assert_eq!(client.session_state(), SessionState::Anonymous);
}
