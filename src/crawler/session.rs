//! Crawl session - breadth-first, site-scoped traversal
//!
//! A [`CrawlSession`] owns everything that must survive between crawls: the
//! dispatch manager, the classifier, the visited set, the accepted article
//! URLs and the statistics. Calling [`CrawlSession::crawl`] borrows the
//! session mutably and returns a [`Crawl`], a lazy sequence that runs one
//! round per pull:
//!
//! 1. Fetch the whole frontier through the dispatch manager (a barrier)
//! 2. Classify each fresh on-site HTML page and collect the accepted ones
//! 3. Union every page's on-site links into the next frontier, minus visited
//!
//! All session state is mutated on the pulling task only; fetch workers never
//! see it.

use crate::classifier::ArticleClassifier;
use crate::config::{validate, Config};
use crate::crawler::batch::{Article, DocumentBatch};
use crate::crawler::parser::parse_body;
use crate::crawler::stats::CrawlStatistics;
use crate::dispatch::{DispatchManager, FetchResult, Transport};
use crate::state::PageState;
use crate::url::{url_identity, SiteScope};
use crate::CrawlError;
use futures::stream::{self, Stream};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// Crawl state shared by every crawl run on one session
pub struct CrawlSession {
    dispatcher: DispatchManager,
    classifier: ArticleClassifier,
    /// Every URL identity fetched so far; only ever grows
    visited: HashSet<String>,
    /// Resolved URLs of every accepted article
    accepted: BTreeSet<String>,
    stats: CrawlStatistics,
}

impl CrawlSession {
    /// Creates a session that fetches over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSession)` - Ready to crawl
    /// * `Err(CrawlError)` - Invalid configuration or HTTP client failure
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        validate(&config)?;
        let dispatcher = DispatchManager::from_config(&config)?;
        Ok(Self::assemble(&config, dispatcher))
    }

    /// Creates a session that fetches through `transport`
    pub fn with_transport(
        config: Config,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, CrawlError> {
        validate(&config)?;
        let ceiling = config.dispatch.max_concurrent_requests;
        let dispatcher = DispatchManager::new(ceiling, transport)?;
        Ok(Self::assemble(&config, dispatcher))
    }

    fn assemble(config: &Config, dispatcher: DispatchManager) -> Self {
        Self {
            dispatcher,
            classifier: ArticleClassifier::new(config.classifier.confidence_threshold),
            visited: HashSet::new(),
            accepted: BTreeSet::new(),
            stats: CrawlStatistics::new(),
        }
    }

    /// Starts a crawl from `root_url` that runs at most `max_iterations` rounds
    ///
    /// Nothing is fetched until the first batch is pulled. The root page is
    /// fetched to seed the frontier but is not itself classified.
    ///
    /// # Returns
    ///
    /// * `Ok(Crawl)` - The lazy sequence of per-round batches
    /// * `Err(CrawlError)` - The root is not an absolute http(s) URL
    pub fn crawl(
        &mut self,
        root_url: &str,
        max_iterations: u32,
    ) -> Result<Crawl<'_>, CrawlError> {
        let site = SiteScope::new(root_url)?;

        tracing::info!(
            "Starting crawl of {} for up to {} rounds",
            site.authority(),
            max_iterations
        );

        Ok(Crawl {
            session: self,
            site,
            frontier: BTreeSet::new(),
            round: 0,
            max_iterations,
            seeded: false,
            finished: false,
            started: Instant::now(),
        })
    }

    /// Every URL fetched so far, across all crawls of this session
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(&url_identity(url))
    }

    /// URLs of every article accepted so far
    pub fn accepted_urls(&self) -> &BTreeSet<String> {
        &self.accepted
    }

    pub fn statistics(&self) -> &CrawlStatistics {
        &self.stats
    }

    pub fn classifier(&self) -> &ArticleClassifier {
        &self.classifier
    }

    /// Fetches the root page and returns its on-site links minus visited
    async fn seed_frontier(&mut self, site: &SiteScope) -> BTreeSet<String> {
        let root = site.root().to_string();
        tracing::debug!("Seeding frontier from {}", root);

        let results = self.dispatcher.execute_batch(vec![root.clone()]).await;
        let Some(result) = results.into_iter().next() else {
            return BTreeSet::new();
        };

        if let Some(error) = &result.error {
            tracing::error!("Failed to fetch root {}: {}", root, error);
            return BTreeSet::new();
        }
        if !result.is_fetchable_page() {
            tracing::warn!(
                "Root {} is not an HTML page (status {:?}, content type {:?})",
                root,
                result.status,
                result.content_type
            );
            return BTreeSet::new();
        }

        let Some(resolved) = site.resolve_on_site(&result.resolved_url) else {
            tracing::warn!("Root {} redirected off site to {}", root, result.resolved_url);
            return BTreeSet::new();
        };

        self.mark_visited(&result);

        let parsed = match parse_body(result.body.as_deref(), &resolved) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Failed to parse root {}: {}", root, e);
                return BTreeSet::new();
            }
        };

        let frontier: BTreeSet<String> = parsed
            .links
            .iter()
            .filter_map(|link| site.resolve_on_site(link.as_str()))
            .map(String::from)
            .filter(|link| !self.visited.contains(link))
            .collect();

        tracing::info!("Seeded frontier with {} URLs", frontier.len());
        frontier
    }

    /// Applies one round's fetch results to the session
    ///
    /// Returns the round's accepted documents and the on-site links found on
    /// its pages (not yet filtered against visited).
    fn absorb_round(
        &mut self,
        round: u32,
        site: &SiteScope,
        results: Vec<FetchResult>,
    ) -> (DocumentBatch, BTreeSet<String>) {
        let mut batch = DocumentBatch::new(round);
        let mut discovered = BTreeSet::new();

        for result in results {
            let state = self.absorb_page(site, &result, &mut batch, &mut discovered);
            if state.marks_visited() {
                self.mark_visited(&result);
            }
            self.stats.record(state);
        }

        self.stats.record_round();
        (batch, discovered)
    }

    /// Adds both the requested and the resolved URL of a fetch to `visited`
    fn mark_visited(&mut self, result: &FetchResult) {
        self.visited.insert(url_identity(&result.requested_url));
        self.visited.insert(url_identity(&result.resolved_url));
    }

    /// Works out what became of one fetched page
    ///
    /// Does not touch `visited`; the caller marks the page according to
    /// [`PageState::marks_visited`] once the outcome is known.
    fn absorb_page(
        &mut self,
        site: &SiteScope,
        result: &FetchResult,
        batch: &mut DocumentBatch,
        discovered: &mut BTreeSet<String>,
    ) -> PageState {
        let requested = result.requested_url.as_str();

        if let Some(error) = &result.error {
            tracing::error!("Failed to fetch {}: {}", requested, error);
            return PageState::TransportFailure;
        }

        if !result.is_fetchable_page() {
            match result.status {
                Some(200) => tracing::debug!(
                    "Skipping non-HTML content at {} ({:?})",
                    requested,
                    result.content_type
                ),
                Some(status) => {
                    tracing::warn!("Failed to retrieve {}: HTTP {}", requested, status)
                }
                None => tracing::warn!("Failed to retrieve {}: no status", requested),
            }
            return PageState::ProtocolMismatch;
        }

        let resolved_id = url_identity(&result.resolved_url);
        if self.visited.contains(&resolved_id) {
            tracing::debug!("{} resolved to visited URL {}", requested, resolved_id);
            return PageState::AlreadyVisited;
        }

        let Some(resolved) = site.resolve_on_site(&result.resolved_url) else {
            tracing::debug!("{} redirected off site to {}", requested, result.resolved_url);
            return PageState::OffSite;
        };

        let parsed = match parse_body(result.body.as_deref(), &resolved) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", resolved, e);
                return PageState::ParseFailure;
            }
        };

        let before = discovered.len();
        let mut on_site = 0;
        for link in parsed.links.iter().filter_map(|l| site.resolve_on_site(l.as_str())) {
            on_site += 1;
            discovered.insert(String::from(link));
        }
        self.stats.record_links(on_site);
        tracing::trace!(
            "{} links on {}, {} new this round",
            on_site,
            resolved,
            discovered.len() - before
        );

        let verdict = self.classifier.classify(resolved.as_str(), &parsed.document);
        if !verdict.accepted {
            tracing::debug!(
                "Rejected {} (confidence {:.2})",
                resolved,
                verdict.confidence
            );
            return PageState::Rejected;
        }

        tracing::debug!(
            "Accepted {} (confidence {:.2})",
            resolved,
            verdict.confidence
        );
        self.accepted.insert(resolved_id);
        batch.push(Article {
            url: resolved,
            title: parsed.title,
            confidence: verdict.confidence,
            document: parsed.document,
        });

        PageState::Accepted
    }
}

/// A lazy, finite sequence of per-round document batches
///
/// Each call to [`Crawl::next_batch`] runs exactly one round. Once it returns
/// `None` it keeps returning `None`; a fresh traversal needs a new call to
/// [`CrawlSession::crawl`].
pub struct Crawl<'a> {
    session: &'a mut CrawlSession,
    site: SiteScope,
    /// URLs to fetch in the next round, all on site and unvisited
    frontier: BTreeSet<String>,
    round: u32,
    max_iterations: u32,
    seeded: bool,
    finished: bool,
    started: Instant,
}

impl<'a> Crawl<'a> {
    /// Runs the next round and returns its batch
    ///
    /// Returns `None` when the iteration limit is reached or the frontier is
    /// empty. An empty batch is a valid result for a round that accepted
    /// nothing.
    pub async fn next_batch(&mut self) -> Option<DocumentBatch> {
        if self.finished {
            return None;
        }

        if self.round >= self.max_iterations {
            self.finish("iteration limit reached");
            return None;
        }

        if !self.seeded {
            self.seeded = true;
            self.frontier = self.session.seed_frontier(&self.site).await;
        }

        if self.frontier.is_empty() {
            self.finish("frontier is empty");
            return None;
        }

        self.round += 1;
        let urls: Vec<String> = std::mem::take(&mut self.frontier).into_iter().collect();
        tracing::info!(
            "Round {}/{}: fetching {} URLs",
            self.round,
            self.max_iterations,
            urls.len()
        );

        let results = self.session.dispatcher.execute_batch(urls).await;
        let (batch, discovered) = self.session.absorb_round(self.round, &self.site, results);

        let visited = &self.session.visited;
        self.frontier = discovered
            .into_iter()
            .filter(|url| !visited.contains(url))
            .collect();

        tracing::info!(
            "Round {} finished: {} articles accepted, {} URLs queued, {} visited",
            self.round,
            batch.len(),
            self.frontier.len(),
            visited.len()
        );

        Some(batch)
    }

    /// The same sequence as a [`Stream`]
    pub fn into_stream(self) -> impl Stream<Item = DocumentBatch> + 'a {
        stream::unfold(self, |mut crawl| async move {
            let batch = crawl.next_batch().await?;
            Some((batch, crawl))
        })
    }

    /// Number of rounds completed so far
    pub fn round(&self) -> u32 {
        self.round
    }

    /// URLs queued for the next round
    pub fn frontier(&self) -> &BTreeSet<String> {
        &self.frontier
    }

    pub fn site(&self) -> &SiteScope {
        &self.site
    }

    /// Size of the session's visited set
    pub fn visited_count(&self) -> usize {
        self.session.visited.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn finish(&mut self, reason: &str) {
        self.finished = true;
        self.frontier.clear();
        tracing::info!(
            "Crawl of {} complete after {} rounds ({}) in {:?}",
            self.site.authority(),
            self.round,
            reason,
            self.started.elapsed()
        );
    }
}
