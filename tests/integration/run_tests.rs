//! End-to-end runs of the coordinator against a mock site

use crate::common::{
    credentials, detail_html, detail_requests, mount_detail, mount_listing_page, mount_login,
    test_config, EXPIRED_HTML,
};
use alba_harvest::crawler::Coordinator;
use alba_harvest::output::OutputFormat;
use alba_harvest::{AdRecord, ScraperError};
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_full_run_writes_json_and_ledger() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_listing_page(&server, 1, &[101, 102, 103]).await;
    mount_detail(&server, 101, &detail_html(101, "미라")).await;
    mount_detail(&server, 102, &detail_html(102, "수아")).await;
    Mock::given(method("GET"))
        .and(path("/guin_detail.php"))
        .and(query_param("num", "103"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(&server.uri());
    config.output.path = dir.path().join("out").join("ads.json");
    config.output.collected_urls = Some(dir.path().join("collected.json"));

    let summary = Coordinator::new(config.clone(), credentials())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.scraped, 2);
    assert_eq!(summary.dropped, 1);
    assert!(!summary.aborted);
    assert_eq!(summary.output_path.as_deref(), Some(config.output.path.as_path()));

    let records: Vec<AdRecord> =
        serde_json::from_str(&fs::read_to_string(&config.output.path).unwrap()).unwrap();
    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![101, 102]);
    assert_eq!(records[1].advertiser.nickname, "수아");
    assert!(records.iter().all(|r| !r.title.is_empty()));

    let ledger: Vec<String> =
        serde_json::from_str(&fs::read_to_string(dir.path().join("collected.json")).unwrap())
            .unwrap();
    assert_eq!(ledger.len(), 2);
}

#[tokio::test]
async fn test_ledger_skips_already_collected() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_listing_page(&server, 1, &[201, 202]).await;
    mount_detail(&server, 201, &detail_html(201, "미라")).await;
    mount_detail(&server, 202, &detail_html(202, "수아")).await;

    let dir = TempDir::new().unwrap();
    let ledger_path = dir.path().join("collected.json");
    fs::write(
        &ledger_path,
        serde_json::to_string(&vec![format!("{}/guin_detail.php?num=201", server.uri())])
            .unwrap(),
    )
    .unwrap();

    let mut config = test_config(&server.uri());
    config.output.path = dir.path().join("ads.jsonl");
    config.output.format = OutputFormat::Jsonl;
    config.output.collected_urls = Some(ledger_path.clone());

    let summary = Coordinator::new(config.clone(), credentials())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.skipped_collected, 1);
    assert_eq!(summary.scraped, 1);
    assert_eq!(detail_requests(&server, 201).await, 0);

    let content = fs::read_to_string(&config.output.path).unwrap();
    assert_eq!(content.lines().count(), 1);

    let ledger: Vec<String> =
        serde_json::from_str(&fs::read_to_string(&ledger_path).unwrap()).unwrap();
    assert_eq!(ledger.len(), 2);
}

#[tokio::test]
async fn test_session_expiry_keeps_partial_output() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_listing_page(&server, 1, &[1, 2, 3, 4]).await;
    mount_detail(&server, 1, &detail_html(1, "가")).await;
    mount_detail(&server, 2, &detail_html(2, "나")).await;
    mount_detail(&server, 3, EXPIRED_HTML).await;
    mount_detail(&server, 4, &detail_html(4, "라")).await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(&server.uri());
    config.scraper.max_concurrent = 1;
    config.output.path = dir.path().join("ads.csv");
    config.output.format = OutputFormat::Csv;

    let summary = Coordinator::new(config.clone(), credentials())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(summary.aborted);
    assert_eq!(summary.scraped, 2);
    assert_eq!(summary.attempted, 3);
    assert_eq!(detail_requests(&server, 4).await, 0);

    let bytes = fs::read(&config.output.path).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let mut reader = csv::Reader::from_reader(&bytes[3..]);
    assert_eq!(reader.records().count(), 2);
}

#[tokio::test]
async fn test_login_failure_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<a href='/adult_index.php'>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(&server.uri());
    config.output.path = dir.path().join("ads.json");

    let err = Coordinator::new(config.clone(), credentials())
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, ScraperError::Login(_)));
    assert!(!config.output.path.exists());
}

#[tokio::test]
async fn test_empty_discovery_writes_nothing() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_listing_page(&server, 1, &[]).await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(&server.uri());
    config.output.path = dir.path().join("ads.json");

    let summary = Coordinator::new(config.clone(), credentials())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.discovered, 0);
    assert!(summary.output_path.is_none());
    assert!(!config.output.path.exists());
}

#[tokio::test]
async fn test_max_ads_caps_detail_fetches() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_listing_page(&server, 1, &[31, 32, 33]).await;
    for id in [31, 32, 33] {
        mount_detail(&server, id, &detail_html(id, "미라")).await;
    }

    let dir = TempDir::new().unwrap();
    let mut config = test_config(&server.uri());
    config.scraper.max_ads = Some(2);
    config.output.path = dir.path().join("ads.json");

    let summary = Coordinator::new(config, credentials())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.scraped, 2);
    assert_eq!(detail_requests(&server, 33).await, 0);
}
