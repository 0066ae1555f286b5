//! Retry, backoff and rate-limit behavior of the fetch layer

use crate::common::{requests_to, test_config, Flaky};
use alba_harvest::crawler::Fetcher;
use alba_harvest::ScraperError;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_for(server: &MockServer, max_retries: u32) -> Fetcher {
    let mut config = test_config(&server.uri());
    config.scraper.max_retries = max_retries;
    Fetcher::from_config(&config.scraper, &config.site).unwrap()
}

#[tokio::test]
async fn test_succeeds_after_transient_failures() {
    let server = MockServer::start().await;
    let flaky = Flaky::new(2, 503, "finally");
    let calls = flaky.calls.clone();
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(flaky)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, 3);
    let body = fetcher
        .get(&format!("{}/flaky", server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "finally");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_always_failing_makes_exactly_max_retries_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, 4);
    let err = fetcher
        .get(&format!("{}/broken", server.uri()))
        .await
        .unwrap_err();

    match err {
        ScraperError::Network { status, .. } => assert_eq!(status, Some(500)),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(requests_to(&server, "/broken").await.len(), 4);
}

#[tokio::test]
async fn test_not_found_is_retried_then_surfaced() {
    let server = MockServer::start().await;

    let fetcher = fetcher_for(&server, 2);
    let err = fetcher
        .get(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(!err.is_fatal());
    assert_eq!(requests_to(&server, "/missing").await.len(), 2);
}

#[tokio::test]
async fn test_rate_limit_waits_for_cooldown() {
    let server = MockServer::start().await;
    let flaky = Flaky::new(1, 429, "after cooldown");
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(flaky)
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.scraper.rate_limit_cooldown_ms = 200;
    config.scraper.backoff_unit_ms = 1;
    let fetcher = Fetcher::from_config(&config.scraper, &config.site).unwrap();

    let started = Instant::now();
    let body = fetcher
        .get(&format!("{}/limited", server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "after cooldown");
    assert!(started.elapsed() >= Duration::from_millis(200));
    assert_eq!(requests_to(&server, "/limited").await.len(), 2);
}

#[tokio::test]
async fn test_exhausted_rate_limit_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "60"))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, 3);
    let err = fetcher
        .get(&format!("{}/limited", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ScraperError::Network {
            status: Some(429),
            ..
        }
    ));
    assert_eq!(requests_to(&server, "/limited").await.len(), 3);
}

#[tokio::test]
async fn test_timeout_is_retried_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_millis(2500)),
        )
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.scraper.timeout_secs = 1;
    config.scraper.max_retries = 2;
    let fetcher = Fetcher::from_config(&config.scraper, &config.site).unwrap();

    let err = fetcher
        .get(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();

    match &err {
        ScraperError::Network { status, message, .. } => {
            assert_eq!(*status, None);
            assert_eq!(message, "Request timeout");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_fatal());
    assert_eq!(requests_to(&server, "/slow").await.len(), 2);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let base = format!("http://127.0.0.1:{}", port);

    let mut config = test_config(&base);
    config.scraper.max_retries = 2;
    let fetcher = Fetcher::from_config(&config.scraper, &config.site).unwrap();

    let err = fetcher.get(&format!("{}/page", base)).await.unwrap_err();

    assert!(matches!(err, ScraperError::Network { status: None, .. }));
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_post_form_sends_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/form"))
        .and(body_string_contains("mb_id=tester"))
        .and(body_string_contains("mb_password=secret1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("accepted"))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, 1);
    let body = fetcher
        .post_form(
            &format!("{}/form", server.uri()),
            &[("mb_id", "tester"), ("mb_password", "secret1")],
        )
        .await
        .unwrap();

    assert_eq!(body, "accepted");
}
