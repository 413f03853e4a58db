//! Integration tests for the dispatch manager
//!
//! Pacing tests run on a paused tokio clock with a scripted transport, so
//! every delay is exact and the tests take no wall-clock time.

use async_trait::async_trait;
use press_ripple::config::Config;
use press_ripple::dispatch::{DispatchManager, FetchResult, HttpTransport, Transport};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Holds each URL for a scripted time and records when its fetch started
struct ScriptedTransport {
    origin: Instant,
    hold: HashMap<String, Duration>,
    started: Mutex<Vec<(String, Duration)>>,
    finished: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn new(hold: &[(&str, u64)]) -> Self {
        Self {
            origin: Instant::now(),
            hold: hold
                .iter()
                .map(|(url, ms)| (url.to_string(), Duration::from_millis(*ms)))
                .collect(),
            started: Mutex::new(Vec::new()),
            finished: Mutex::new(Vec::new()),
        }
    }

    fn finished(&self, url: &str) -> bool {
        self.finished.lock().unwrap().iter().any(|u| u == url)
    }

    fn started_at(&self, url: &str) -> Duration {
        self.started
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, at)| *at)
            .unwrap_or_else(|| panic!("{} was never fetched", url))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> FetchResult {
        self.started
            .lock()
            .unwrap()
            .push((url.to_string(), self.origin.elapsed()));

        if let Some(hold) = self.hold.get(url) {
            tokio::time::sleep(*hold).await;
        }
        self.finished.lock().unwrap().push(url.to_string());
        FetchResult::html(url, "<html><body>ok</body></html>")
    }
}

fn urls(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("https://site.com/{}", i)).collect()
}

fn assert_between(actual: Duration, low_ms: u64, high_ms: u64) {
    assert!(
        actual >= Duration::from_millis(low_ms) && actual < Duration::from_millis(high_ms),
        "expected {:?} in [{}ms, {}ms)",
        actual,
        low_ms,
        high_ms
    );
}

#[tokio::test(start_paused = true)]
async fn test_moderate_load_paces_later_submissions() {
    // Only the third fetch lingers, keeping one of two workers busy
    let transport = Arc::new(ScriptedTransport::new(&[("https://site.com/3", 550)]));
    let mut manager = DispatchManager::new(2, transport.clone()).unwrap();

    let start = Instant::now();
    let results = manager.execute_batch(urls(5)).await;
    let elapsed = start.elapsed();

    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| !r.is_error()));

    assert_between(transport.started_at("https://site.com/1"), 0, 10);
    assert_between(transport.started_at("https://site.com/2"), 0, 10);
    assert_between(transport.started_at("https://site.com/3"), 0, 10);
    // 1 of 2 in flight is 50%: 250ms before each of the last two
    assert_between(transport.started_at("https://site.com/4"), 250, 260);
    assert_between(transport.started_at("https://site.com/5"), 500, 510);

    assert_between(elapsed, 500, 750);
    assert_eq!(manager.active(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_heavy_load_throttles_harder() {
    let transport = Arc::new(ScriptedTransport::new(&[
        ("https://site.com/1", 1000),
        ("https://site.com/2", 1000),
        ("https://site.com/3", 1000),
    ]));
    let mut manager = DispatchManager::new(4, transport.clone()).unwrap();

    let results = manager.execute_batch(urls(4)).await;
    assert_eq!(results.len(), 4);

    // 0% and 25% submit at once, 50% waits 250ms, 75% waits 500ms
    assert_between(transport.started_at("https://site.com/1"), 0, 10);
    assert_between(transport.started_at("https://site.com/2"), 0, 10);
    assert_between(transport.started_at("https://site.com/3"), 250, 260);
    assert_between(transport.started_at("https://site.com/4"), 750, 760);
}

#[tokio::test(start_paused = true)]
async fn test_idle_manager_submits_without_delay() {
    let transport = Arc::new(ScriptedTransport::new(&[]));
    let mut manager = DispatchManager::new(256, transport.clone()).unwrap();

    let start = Instant::now();
    let results = manager.execute_batch(urls(20)).await;

    assert_eq!(results.len(), 20);
    assert!(start.elapsed() < Duration::from_millis(10));
}

#[tokio::test(start_paused = true)]
async fn test_dropped_batch_aborts_its_fetches() {
    let transport = Arc::new(ScriptedTransport::new(&[("https://site.com/1", 300)]));
    let mut manager = DispatchManager::new(2, transport.clone()).unwrap();

    let cancelled = tokio::time::timeout(
        Duration::from_millis(50),
        manager.execute_batch(urls(1)),
    )
    .await;
    assert!(cancelled.is_err());

    // The aborted worker releases its slot without finishing the fetch
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(manager.active(), 0);

    let start = Instant::now();
    let batch = vec![
        "https://site.com/2".to_string(),
        "https://site.com/3".to_string(),
    ];
    assert_eq!(manager.execute_batch(batch).await.len(), 2);
    assert!(start.elapsed() < Duration::from_millis(10));

    // Well past the point where the dropped fetch would have completed
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!transport.finished("https://site.com/1"));
    assert_eq!(manager.active(), 0);

    let start = Instant::now();
    let batch = vec![
        "https://site.com/4".to_string(),
        "https://site.com/5".to_string(),
    ];
    assert_eq!(manager.execute_batch(batch).await.len(), 2);
    assert!(start.elapsed() < Duration::from_millis(10));
}

#[tokio::test]
async fn test_http_batch_keeps_cardinality_with_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html><body>ok</body></html>", "text/html"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html></html>", "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.dispatch.request_timeout_ms = 500;
    let transport =
        HttpTransport::from_config(&config.dispatch, &config.user_agent).expect("client");
    let mut manager = DispatchManager::new(4, Arc::new(transport)).unwrap();

    let batch = vec![
        format!("{}/ok", mock_server.uri()),
        format!("{}/missing", mock_server.uri()),
        format!("{}/slow", mock_server.uri()),
        // Nothing listens on port 1
        "http://127.0.0.1:1/".to_string(),
    ];
    let results = manager.execute_batch(batch.clone()).await;

    assert_eq!(results.len(), batch.len());
    let requested: Vec<_> = results.iter().map(|r| r.requested_url.clone()).collect();
    assert_eq!(requested, batch);

    assert!(results[0].is_fetchable_page());
    assert_eq!(results[0].body.as_deref(), Some("<html><body>ok</body></html>"));

    assert!(!results[1].is_error());
    assert_eq!(results[1].status, Some(404));
    assert!(results[1].body.is_none());

    assert!(results[2].is_error());
    assert!(results[3].is_error());
}

#[tokio::test]
async fn test_manager_from_default_config() {
    let manager = DispatchManager::from_config(&Config::default()).unwrap();
    assert_eq!(manager.ceiling(), 256);
    assert_eq!(manager.active(), 0);
}
