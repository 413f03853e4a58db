//! Crawl statistics
//!
//! Counts what happened to every fetched URL across all crawls of a session.

use crate::state::PageState;
use std::collections::HashMap;

/// Cumulative statistics for a crawl session
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Number of completed rounds
    pub rounds: u32,

    /// Number of fetch results processed (seed fetches excluded)
    pub fetched: u64,

    /// Count of fetch results by outcome
    pub pages_by_state: HashMap<PageState, u64>,

    /// On-site links extracted from fetched pages, before deduplication
    pub discovered_links: u64,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one fetch result
    pub fn record(&mut self, state: PageState) {
        self.fetched += 1;
        *self.pages_by_state.entry(state).or_insert(0) += 1;
    }

    pub fn record_round(&mut self) {
        self.rounds += 1;
    }

    pub fn record_links(&mut self, count: usize) {
        self.discovered_links += count as u64;
    }

    /// Number of results that ended in `state`
    pub fn count(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    pub fn accepted(&self) -> u64 {
        self.count(PageState::Accepted)
    }

    /// Number of results in an error state
    pub fn errors(&self) -> u64 {
        self.pages_by_state
            .iter()
            .filter(|(state, _)| state.is_error())
            .map(|(_, count)| count)
            .sum()
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Rounds completed: {}", stats.rounds);
    println!("  Pages fetched: {}", stats.fetched);
    println!("  On-site links found: {}", stats.discovered_links);
    println!();

    println!("Pages by State:");
    // Sort states by count (descending)
    let mut state_counts: Vec<_> = stats.pages_by_state.iter().collect();
    state_counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

    for (state, count) in state_counts {
        let percentage = if stats.fetched > 0 {
            (*count as f64 / stats.fetched as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    let acceptance_rate = if stats.fetched > 0 {
        (stats.accepted() as f64 / stats.fetched as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Acceptance Rate: {:.1}% ({} / {} pages accepted as articles)",
        acceptance_rate,
        stats.accepted(),
        stats.fetched
    );
}
