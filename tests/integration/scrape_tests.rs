//! Integration tests for the scrape pipeline
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! fetcher, the concurrent engine and the three scrape phases end-to-end.

use chrono::{DateTime, Duration, Utc};
use lang_pulse::config::{Config, ScraperConfig, SourcesConfig};
use lang_pulse::scrape::{build_http_client, HttpFetcher, RetryPolicy, Scraper};
use lang_pulse::ScrapeError;
use std::time::Instant;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing every source at the mock server
fn create_test_config(base_url: &str, retry_delays_ms: Vec<u64>) -> Config {
    Config {
        sources: SourcesConfig {
            ranking_url: format!("{}/tiobe-index/", base_url),
            entity_url: format!("{}/topics/%entity%", base_url),
            topic_url: format!("{}/topics/%topic%?o=desc&page=%page%", base_url),
        },
        scraper: ScraperConfig {
            retry_delays_ms,
            max_parallel: 3,
            max_pages: 3,
            interest: "sort".to_string(),
            ..ScraperConfig::default()
        },
        ..Config::default()
    }
}

fn fetcher(delays_ms: &[u64]) -> HttpFetcher {
    let client = build_http_client(&ScraperConfig::default()).expect("Failed to build client");
    HttpFetcher::new(client, RetryPolicy::from_millis(delays_ms))
}

fn count_page(count: &str) -> String {
    format!(
        r#"<html><body><h2 class="h3 color-fg-muted">
            Here are {} public repositories matching this topic...
        </h2></body></html>"#,
        count
    )
}

fn ranking_page(names: &[&str]) -> String {
    let mut html = String::from(r#"<html><body><table id="top20" class="table table-top20"><tbody>"#);
    for (row, name) in names.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td>{rank}</td><td>{rank}</td><td></td><td class=\"td-top20\"><img src=\"x.png\"></td><td>{name}</td><td>10.00%</td><td>+1.00%</td></tr>",
            rank = row + 1,
            name = name
        ));
    }
    html.push_str("</tbody></table></body></html>");
    html
}

fn listing_article(updated: DateTime<Utc>, tags: &[&str]) -> String {
    let links: String = tags
        .iter()
        .map(|t| format!("<a class=\"topic-tag topic-tag-link f6\" href=\"/topics/{t}\">\n  {t}\n</a>"))
        .collect();
    format!(
        "<article class=\"border rounded color-shadow-small\"><relative-time datetime=\"{}\" class=\"no-wrap\"></relative-time>{}</article>",
        updated.format("%Y-%m-%dT%H:%M:%SZ"),
        links
    )
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .expect("Request recording is enabled")
        .len()
}

#[tokio::test]
async fn test_fetch_retries_until_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&mock_server)
        .await;

    let fetcher = fetcher(&[50, 100]);
    let start = Instant::now();
    let body = fetcher
        .get(&format!("{}/page", mock_server.uri()))
        .await
        .expect("Fetch should succeed on the third attempt");

    assert_eq!(body, b"hello");
    assert_eq!(request_count(&mock_server).await, 3);
    assert!(
        start.elapsed() >= std::time::Duration::from_millis(150),
        "Both delays should have been slept, elapsed {:?}",
        start.elapsed()
    );
}

#[tokio::test]
async fn test_fetch_exhausts_policy_with_last_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let err = fetcher(&[5, 5, 5])
        .get(&format!("{}/page", mock_server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(429));
    assert_eq!(request_count(&mock_server).await, 4);
}

#[tokio::test]
async fn test_fetch_without_policy_fails_immediately() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let err = fetcher(&[])
        .get(&format!("{}/page", mock_server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert_eq!(request_count(&mock_server).await, 1);
}

#[tokio::test]
async fn test_transport_error_is_not_retried() {
    // Nothing listens on port 1
    let start = Instant::now();
    let err = fetcher(&[2_000, 2_000])
        .get("http://127.0.0.1:1/page")
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::Transport { .. }));
    assert!(start.elapsed() < std::time::Duration::from_millis(2_000));
}

#[tokio::test]
async fn test_scrape_ranking_applies_aliases() {
    let mock_server = MockServer::start().await;

    let mut names = vec!["Python", "C++", "C#", "Go"];
    let fillers: Vec<String> = (5..=20).map(|i| format!("Lang{}", i)).collect();
    names.extend(fillers.iter().map(String::as_str));

    Mock::given(method("GET"))
        .and(path("/tiobe-index/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ranking_page(&names)))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), vec![]);
    let scraper = Scraper::new(&config).expect("Failed to create scraper");

    let languages = scraper.scrape_ranking().await.expect("Ranking failed");
    assert_eq!(languages.len(), 20);
    assert_eq!(&languages[..4], &["Python", "cpp", "csharp", "Go"]);
    assert_eq!(languages[19], "Lang20");
}

#[tokio::test]
async fn test_scrape_ranking_missing_table() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>maintenance</body></html>"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), vec![]);
    let scraper = Scraper::new(&config).expect("Failed to create scraper");

    let err = scraper.scrape_ranking().await.unwrap_err();
    assert!(matches!(err, ScrapeError::Parse("table")));
}

#[tokio::test]
async fn test_scrape_counts_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/topics/go"))
        .respond_with(ResponseTemplate::new(200).set_body_string(count_page("1500")))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/topics/rust"))
        .respond_with(ResponseTemplate::new(200).set_body_string(count_page("2,300")))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), vec![]);
    let scraper = Scraper::new(&config).expect("Failed to create scraper");

    let outcome = scraper
        .scrape_counts(&["go".to_string(), "rust".to_string()])
        .await;

    assert!(outcome.last_error.is_none());
    assert_eq!(outcome.attempted, 2);
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.results["go"], 1500);
    assert_eq!(outcome.results["rust"], 2300);
}

#[tokio::test]
async fn test_scrape_counts_partial_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/topics/go"))
        .respond_with(ResponseTemplate::new(200).set_body_string(count_page("1500")))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/topics/cobol"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), vec![1]);
    let scraper = Scraper::new(&config).expect("Failed to create scraper");

    let outcome = scraper
        .scrape_counts(&["go".to_string(), "cobol".to_string()])
        .await;

    assert_eq!(outcome.succeeded, 1);
    assert_eq!(outcome.last_error.as_ref().and_then(|e| e.status()), Some(404));

    let counts = outcome.into_result("languages").expect("Partial success is not fatal");
    assert_eq!(counts.len(), 1);
    assert_eq!(counts["go"], 1500);
}

#[tokio::test]
async fn test_scrape_interest_counts_recent_tags() {
    let mock_server = MockServer::start().await;
    let now = Utc::now();

    let page1 = format!(
        "<html><body>{}{}{}</body></html>",
        listing_article(now - Duration::days(1), &["rust", "sort", "cli"]),
        listing_article(now - Duration::days(40), &["stale"]),
        listing_article(now - Duration::days(2), &["unreached"]),
    );
    let page2 = format!(
        "<html><body>{}{}</body></html>",
        listing_article(now - Duration::days(3), &["rust"]),
        listing_article(now - Duration::days(4), &["python", "cli"]),
    );

    Mock::given(method("GET"))
        .and(path("/topics/sort"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page1))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/topics/sort"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page2))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/topics/sort"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), vec![]);
    let scraper = Scraper::new(&config).expect("Failed to create scraper");

    let outcome = scraper.scrape_interest_at(now).await;

    assert_eq!(outcome.attempted, 3);
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.last_error.as_ref().and_then(|e| e.status()), Some(500));

    let tags = outcome.into_result("interest").expect("Partial success is not fatal");
    assert_eq!(tags.get("rust"), Some(&2));
    assert_eq!(tags.get("cli"), Some(&2));
    assert_eq!(tags.get("python"), Some(&1));
    assert!(!tags.contains_key("sort"), "The topic itself is not counted");
    assert!(!tags.contains_key("stale"));
    assert!(!tags.contains_key("unreached"));

    // Page numbering starts at 1
    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| !r.url.query().unwrap_or_default().contains("page=0")));
}

#[tokio::test]
async fn test_scrape_interest_total_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), vec![1]);
    let scraper = Scraper::new(&config).expect("Failed to create scraper");

    let err = scraper
        .scrape_interest()
        .await
        .into_result("interest")
        .unwrap_err();
    assert_eq!(err.status(), Some(503));

    // 3 pages, 2 attempts each
    assert_eq!(request_count(&mock_server).await, 6);
}
