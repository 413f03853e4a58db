//! Batch request dispatch under a concurrency ceiling
//!
//! The manager drains a pending queue one URL at a time. Before each
//! submission it samples the current load and sleeps according to the pacing
//! table, then hands the URL to a worker task. Workers hold a permit from a
//! semaphore sized to the ceiling, so pacing is a throughput throttle while
//! the semaphore is the hard limit.

use crate::config::{validate_ceiling, validate_dispatch_config, Config};
use crate::dispatch::load::{LoadLevel, LoadSample};
use crate::dispatch::transport::{FetchError, FetchResult, HttpTransport, Transport};
use crate::{ConfigError, CrawlError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Executes batches of fetches with load-adaptive pacing
///
/// Each crawl session owns its own manager; the load counters are never
/// shared between managers.
pub struct DispatchManager {
    /// Performs the actual GET requests
    transport: Arc<dyn Transport>,

    /// Maximum number of fetches in flight
    ceiling: usize,

    /// Worker pool permits, one per in-flight fetch
    workers: Arc<Semaphore>,

    /// Fetches currently holding a worker permit
    active: Arc<AtomicUsize>,
}

impl DispatchManager {
    /// Creates a new dispatch manager
    ///
    /// # Arguments
    ///
    /// * `ceiling` - Maximum number of concurrent fetches; must be at least 1
    /// * `transport` - The transport each worker uses to fetch
    ///
    /// # Returns
    ///
    /// * `Ok(DispatchManager)` - Ready to execute batches
    /// * `Err(ConfigError)` - The ceiling is zero
    pub fn new(ceiling: usize, transport: Arc<dyn Transport>) -> Result<Self, ConfigError> {
        validate_ceiling(ceiling)?;

        tracing::debug!("New dispatch manager with ceiling {}", ceiling);

        Ok(Self {
            transport,
            ceiling,
            workers: Arc::new(Semaphore::new(ceiling)),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Creates a manager backed by an [`HttpTransport`] built from `config`
    pub fn from_config(config: &Config) -> Result<Self, CrawlError> {
        validate_dispatch_config(&config.dispatch)?;
        let transport = HttpTransport::from_config(&config.dispatch, &config.user_agent)?;
        Ok(Self::new(
            config.dispatch.max_concurrent_requests,
            Arc::new(transport),
        )?)
    }

    /// The concurrency ceiling
    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Number of fetches currently in flight
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Samples the current load
    pub fn load(&self) -> LoadSample {
        LoadSample::new(self.active(), self.ceiling)
    }

    /// Fetches every URL in `urls` and returns one result per URL
    ///
    /// Blocks until all submitted fetches have completed or failed. Results
    /// come back in submission order, but callers should correlate them by
    /// [`FetchResult::requested_url`]. Individual failures never make this
    /// method fail; they show up as results with `error` set.
    pub async fn execute_batch(&mut self, urls: Vec<String>) -> Vec<FetchResult> {
        if urls.is_empty() {
            return Vec::new();
        }

        tracing::info!("Executing request batch of {} requests", urls.len());

        let mut pending: VecDeque<String> = urls.into();
        let mut handles = BatchHandles::with_capacity(pending.len());

        while let Some(url) = pending.pop_front() {
            let sample = self.load();
            let delay = sample.pacing_delay();

            if !delay.is_zero() {
                if sample.level() == LoadLevel::Heavy {
                    tracing::warn!(
                        "Heavy load ({:.1}%), throttling {} by {:?}",
                        sample.ratio(),
                        url,
                        delay
                    );
                } else {
                    tracing::debug!(
                        "{} load ({:.1}%), pacing {} by {:?}",
                        sample.level(),
                        sample.ratio(),
                        url,
                        delay
                    );
                }
                tokio::time::sleep(delay).await;
            }

            let handle = self.submit(url.clone());
            handles.slots.push((url, handle));

            // Let the worker pick the task up before the next load sample
            tokio::task::yield_now().await;
        }

        let mut results = Vec::with_capacity(handles.slots.len());
        for (url, handle) in handles.slots.iter_mut() {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!("Fetch task for {} failed: {}", url, e);
                    let error = FetchError::TaskFailed(e.to_string());
                    results.push(FetchResult::failed(url.as_str(), error));
                }
            }
        }

        results
    }

    /// Spawns the worker task for one URL
    fn submit(&self, url: String) -> JoinHandle<FetchResult> {
        let transport = Arc::clone(&self.transport);
        let workers = Arc::clone(&self.workers);
        let active = Arc::clone(&self.active);

        tokio::spawn(async move {
            let _permit = match workers.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return FetchResult::failed(url, FetchError::TaskFailed(e.to_string())),
            };
            let _in_flight = InFlight::enter(active);
            transport.get(&url).await
        })
    }
}

/// Worker handles of one batch, one slot per submission
///
/// Dropping the batch future before every slot is joined aborts the fetches
/// still outstanding, so no worker outlives the batch that spawned it.
struct BatchHandles {
    slots: Vec<(String, JoinHandle<FetchResult>)>,
}

impl BatchHandles {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }
}

impl Drop for BatchHandles {
    fn drop(&mut self) {
        for (_, handle) in &self.slots {
            handle.abort();
        }
    }
}

/// Counts a fetch as active for as long as it is alive
struct InFlight {
    counter: Arc<AtomicUsize>,
}

impl InFlight {
    fn enter(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}
