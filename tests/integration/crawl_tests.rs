//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use press_ripple::config::Config;
use press_ripple::{CrawlSession, PageState};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a small ceiling and short timeout
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.dispatch.max_concurrent_requests = 8;
    config.dispatch.request_timeout_ms = 1000;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

fn html_page(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

/// A listing page linking to `hrefs`
fn index_page(title: &str, hrefs: &[&str]) -> ResponseTemplate {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    html_page(format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, anchors
    ))
}

/// A page carrying every markup signal of a news article
fn article_page(title: &str, hrefs: &[&str]) -> ResponseTemplate {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    html_page(format!(
        r#"<html><head>
            <title>{title}</title>
            <meta property="og:type" content="article">
            <meta name="article:published_time" content="2024-05-01T08:00:00Z">
        </head><body>
            <h1>{title}</h1>
            <article>{paragraphs}</article>
            {anchors}
        </body></html>"#,
        title = title,
        paragraphs = "<p>Reporting continues.</p>".repeat(6),
        anchors = anchors
    ))
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount(
        &mock_server,
        "/",
        index_page(
            "Home",
            &[
                "/2024/05/01/harbor-reopens",
                "/category/local",
                // Off-site links must never be requested
                "http://off-site.invalid/2024/05/01/elsewhere",
            ],
        ),
        1,
    )
    .await;
    mount(
        &mock_server,
        "/2024/05/01/harbor-reopens",
        article_page("Harbor reopens", &["/", "/2024/05/02/ferry-schedule"]),
        1,
    )
    .await;
    mount(
        &mock_server,
        "/category/local",
        index_page("Local", &["/2024/05/01/harbor-reopens", "/2024/05/02/ferry-schedule"]),
        1,
    )
    .await;
    mount(
        &mock_server,
        "/2024/05/02/ferry-schedule",
        article_page("Ferry schedule", &["/category/local"]),
        1,
    )
    .await;

    let mut session = CrawlSession::new(create_test_config()).unwrap();
    let mut crawl = session.crawl(&base_url, 5).unwrap();

    let first = crawl.next_batch().await.expect("first round");
    assert_eq!(first.round(), 1);
    assert_eq!(first.len(), 1);
    assert_eq!(first.articles()[0].title.as_deref(), Some("Harbor reopens"));
    assert_eq!(
        first.articles()[0].url.as_str(),
        format!("{}/2024/05/01/harbor-reopens", base_url)
    );

    let second = crawl.next_batch().await.expect("second round");
    assert_eq!(second.len(), 1);
    assert_eq!(second.articles()[0].title.as_deref(), Some("Ferry schedule"));

    // Every linked page is visited now
    assert!(crawl.next_batch().await.is_none());
    assert!(crawl.next_batch().await.is_none());
    drop(crawl);

    assert_eq!(session.accepted_urls().len(), 2);
    let stats = session.statistics();
    assert_eq!(stats.rounds, 2);
    assert_eq!(stats.count(PageState::Accepted), 2);
    assert_eq!(stats.count(PageState::Rejected), 1);
    assert!(session.visited().iter().all(|u| u.starts_with(&base_url)));
}

#[tokio::test]
async fn test_iteration_limit_stops_crawl() {
    let mock_server = MockServer::start().await;

    // An endless chain of on-site pages
    mount(&mock_server, "/", index_page("Home", &["/p1"]), 1).await;
    mount(&mock_server, "/p1", index_page("P1", &["/p2"]), 1).await;
    mount(&mock_server, "/p2", index_page("P2", &["/p3"]), 1).await;
    mount(&mock_server, "/p3", index_page("P3", &["/p4"]), 0).await;

    let mut session = CrawlSession::new(create_test_config()).unwrap();
    let mut crawl = session.crawl(&mock_server.uri(), 2).unwrap();

    let mut batches = 0;
    while let Some(_batch) = crawl.next_batch().await {
        batches += 1;
    }

    assert_eq!(batches, 2);
    assert_eq!(crawl.round(), 2);
}

#[tokio::test]
async fn test_empty_batches_are_yielded() {
    let mock_server = MockServer::start().await;

    mount(&mock_server, "/", index_page("Home", &["/tag/a"]), 1).await;
    mount(&mock_server, "/tag/a", index_page("A", &["/tag/b"]), 1).await;
    mount(&mock_server, "/tag/b", index_page("B", &[]), 1).await;

    let mut session = CrawlSession::new(create_test_config()).unwrap();
    let mut crawl = session.crawl(&mock_server.uri(), 5).unwrap();

    let first = crawl.next_batch().await.expect("first round");
    let second = crawl.next_batch().await.expect("second round");
    assert!(first.is_empty());
    assert!(second.is_empty());
    assert_eq!(second.round(), 2);
    assert!(crawl.next_batch().await.is_none());
}

#[tokio::test]
async fn test_visited_grows_monotonically() {
    let mock_server = MockServer::start().await;

    mount(&mock_server, "/", index_page("Home", &["/a", "/b"]), 1).await;
    mount(&mock_server, "/a", index_page("A", &["/", "/b", "/c"]), 1).await;
    mount(&mock_server, "/b", index_page("B", &["/a", "/c", "/d"]), 1).await;
    mount(&mock_server, "/c", index_page("C", &["/a", "/d"]), 1).await;
    mount(&mock_server, "/d", index_page("D", &["/a", "/b"]), 1).await;

    let mut session = CrawlSession::new(create_test_config()).unwrap();
    let mut crawl = session.crawl(&mock_server.uri(), 10).unwrap();

    let mut previous = 0;
    let mut rounds = 0;
    while let Some(_batch) = crawl.next_batch().await {
        let now = crawl.visited_count();
        assert!(now >= previous, "visited shrank from {} to {}", previous, now);
        previous = now;
        rounds += 1;
    }

    // Root, then {a, b}, then {c, d}
    assert_eq!(rounds, 2);
    assert_eq!(previous, 5);
    // Each mock expects exactly one request; duplicates fail on drop
}

#[tokio::test]
async fn test_failed_and_non_html_pages_are_skipped() {
    let mock_server = MockServer::start().await;

    mount(
        &mock_server,
        "/",
        index_page("Home", &["/report.pdf", "/gone", "/slow", "/empty", "/ok"]),
        1,
    )
    .await;
    mount(
        &mock_server,
        "/report.pdf",
        ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"),
        1,
    )
    .await;
    mount(&mock_server, "/gone", ResponseTemplate::new(404), 1).await;
    mount(
        &mock_server,
        "/slow",
        index_page("Slow", &[]).set_delay(Duration::from_secs(3)),
        1,
    )
    .await;
    mount(&mock_server, "/empty", html_page(String::new()), 1).await;
    mount(&mock_server, "/ok", index_page("Ok", &[]), 1).await;

    let mut session = CrawlSession::new(create_test_config()).unwrap();
    let mut crawl = session.crawl(&mock_server.uri(), 3).unwrap();

    let batch = crawl.next_batch().await.expect("one round");
    assert!(batch.is_empty());
    assert!(crawl.next_batch().await.is_none());
    drop(crawl);

    let stats = session.statistics();
    assert_eq!(stats.fetched, 5);
    assert_eq!(stats.count(PageState::ProtocolMismatch), 2);
    assert_eq!(stats.count(PageState::TransportFailure), 1);
    assert_eq!(stats.count(PageState::ParseFailure), 1);
    assert_eq!(stats.count(PageState::Rejected), 1);

    let base = mock_server.uri();
    assert!(session.is_visited(&format!("{}/ok", base)));
    assert!(session.is_visited(&format!("{}/empty", base)));
    assert!(!session.is_visited(&format!("{}/gone", base)));
    assert!(!session.is_visited(&format!("{}/report.pdf", base)));
    assert!(!session.is_visited(&format!("{}/slow", base)));
}

#[tokio::test]
async fn test_session_can_be_resumed() {
    let mock_server = MockServer::start().await;

    // The root is fetched once per crawl; everything else only once
    mount(&mock_server, "/", index_page("Home", &["/news", "/2024/05/03/budget-vote"]), 2).await;
    mount(&mock_server, "/news", index_page("News", &[]), 1).await;
    mount(
        &mock_server,
        "/2024/05/03/budget-vote",
        article_page("Budget vote", &[]),
        1,
    )
    .await;

    let mut session = CrawlSession::new(create_test_config()).unwrap();

    {
        let mut crawl = session.crawl(&mock_server.uri(), 1).unwrap();
        let batch = crawl.next_batch().await.expect("first crawl");
        assert_eq!(batch.len(), 1);
    }
    let visited = session.visited().len();

    {
        let mut crawl = session.crawl(&mock_server.uri(), 1).unwrap();
        assert!(crawl.next_batch().await.is_none());
    }

    assert_eq!(session.visited().len(), visited);
    assert_eq!(session.accepted_urls().len(), 1);
}

#[tokio::test]
async fn test_invalid_configuration_fails_before_crawling() {
    let mut config = create_test_config();
    config.dispatch.max_concurrent_requests = 0;
    assert!(CrawlSession::new(config).is_err());

    let mut config = create_test_config();
    config.dispatch.request_timeout_ms = 0;
    assert!(CrawlSession::new(config).is_err());
}
