//! Load sampling and submission pacing
//!
//! Before each submission the dispatch loop samples how many fetches are in
//! flight relative to the concurrency ceiling and sleeps for a delay picked
//! from the pacing table. Bands are closed-open: a ratio of exactly 50.0%
//! falls in the 250 ms band, not the 10 ms one.

use std::fmt;
use std::time::Duration;

/// Lower bound (percent) of the regular band
pub const REGULAR_LOAD_PERCENT: f64 = 33.3;

/// Lower bound (percent) of the moderate band
pub const MODERATE_LOAD_PERCENT: f64 = 50.0;

/// Lower bound (percent) of the heavy band
pub const HEAVY_LOAD_PERCENT: f64 = 75.0;

/// Load band derived from a [`LoadSample`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LoadLevel {
    /// Below 33.3%: submit immediately
    Low,
    /// 33.3% up to 50%
    Regular,
    /// 50% up to 75%
    Moderate,
    /// 75% and above
    Heavy,
}

impl LoadLevel {
    /// Maps a load ratio (percent) to its band
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < REGULAR_LOAD_PERCENT {
            Self::Low
        } else if ratio < MODERATE_LOAD_PERCENT {
            Self::Regular
        } else if ratio < HEAVY_LOAD_PERCENT {
            Self::Moderate
        } else {
            Self::Heavy
        }
    }

    /// Delay applied before submitting a request at this load
    pub fn pacing_delay(&self) -> Duration {
        match self {
            Self::Low => Duration::ZERO,
            Self::Regular => Duration::from_millis(10),
            Self::Moderate => Duration::from_millis(250),
            Self::Heavy => Duration::from_millis(500),
        }
    }
}

impl fmt::Display for LoadLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Regular => "regular",
            Self::Moderate => "moderate",
            Self::Heavy => "heavy",
        };
        write!(f, "{}", name)
    }
}

/// A snapshot of dispatch load taken right before a submission decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSample {
    /// Fetches currently in flight
    pub active: usize,
    /// Concurrency ceiling
    pub ceiling: usize,
}

impl LoadSample {
    pub fn new(active: usize, ceiling: usize) -> Self {
        Self { active, ceiling }
    }

    /// Load ratio as a percentage of the ceiling
    ///
    /// A zero ceiling never reaches a sample (it is rejected at construction)
    /// but is reported as fully loaded rather than dividing by zero.
    pub fn ratio(&self) -> f64 {
        if self.ceiling == 0 {
            return 100.0;
        }
        self.active as f64 / self.ceiling as f64 * 100.0
    }

    pub fn level(&self) -> LoadLevel {
        LoadLevel::from_ratio(self.ratio())
    }

    pub fn pacing_delay(&self) -> Duration {
        self.level().pacing_delay()
    }
}
