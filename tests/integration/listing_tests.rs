//! Listing pagination against a mock site

use crate::common::{credentials, mount_listing_page, mount_login, requests_to, test_config};
use alba_harvest::crawler::SiteClient;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_only_detail_anchors_are_collected() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_listing_page(&server, 1, &[11, 12, 13]).await;

    let client = SiteClient::from_config(&test_config(&server.uri())).unwrap();
    client.login(&credentials()).await.unwrap();

    let urls = client.get_ad_urls(1).await.unwrap();

    assert_eq!(urls.len(), 3);
    for (url, id) in urls.iter().zip([11, 12, 13]) {
        assert_eq!(
            *url,
            format!("{}/guin_detail.php?num={}", server.uri(), id)
        );
    }
}

#[tokio::test]
async fn test_pages_are_deduplicated_and_failed_pages_skipped() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_listing_page(&server, 1, &[1, 2, 3]).await;
    Mock::given(method("GET"))
        .and(path("/guin_list.php"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    mount_listing_page(&server, 3, &[3, 4, 1]).await;

    let client = SiteClient::from_config(&test_config(&server.uri())).unwrap();
    client.login(&credentials()).await.unwrap();

    let urls = client.get_ad_urls(3).await.unwrap();

    let ids: Vec<&str> = urls
        .iter()
        .map(|u| u.rsplit('=').next().unwrap())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3", "4"]);

    // page 2 is retried max_retries times before being skipped
    let page_two = requests_to(&server, "/guin_list.php")
        .await
        .iter()
        .filter(|r| r.url.query() == Some("page=2"))
        .count();
    assert_eq!(page_two, 3);
}
