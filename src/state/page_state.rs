/// Page outcome definitions for tracking crawl progress
///
/// This module defines what can happen to a URL during one crawl round.
use std::fmt;

/// Represents what became of a fetched URL in a crawl round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageState {
    // ===== Success States =====
    /// Page was classified as an article and added to the round's batch
    Accepted,

    /// Page was fetched and parsed but scored below the threshold
    Rejected,

    // ===== Skip States =====
    /// Resolved URL was already visited earlier in the session
    AlreadyVisited,

    /// A redirect took the request off the crawled site
    OffSite,

    // ===== Error States =====
    /// Connection failure, DNS failure, timeout, or a failed fetch task
    TransportFailure,

    /// Non-200 status or non-HTML content type
    ProtocolMismatch,

    /// Body missing or empty; the URL still counts as visited
    ParseFailure,
}

impl PageState {
    /// Returns true if the page was fetched and classified
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }

    /// Returns true if the page was deliberately skipped
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::AlreadyVisited | Self::OffSite)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::TransportFailure | Self::ProtocolMismatch | Self::ParseFailure
        )
    }

    /// Returns true if the URL enters the visited set
    ///
    /// Transport and protocol failures are not visited, so the URL may be
    /// fetched again when another page links to it.
    pub fn marks_visited(&self) -> bool {
        matches!(
            self,
            Self::Accepted
                | Self::Rejected
                | Self::AlreadyVisited
                | Self::OffSite
                | Self::ParseFailure
        )
    }

    /// Short stable name used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::AlreadyVisited => "already_visited",
            Self::OffSite => "off_site",
            Self::TransportFailure => "transport_failure",
            Self::ProtocolMismatch => "protocol_mismatch",
            Self::ParseFailure => "parse_failure",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Accepted,
            Self::Rejected,
            Self::AlreadyVisited,
            Self::OffSite,
            Self::TransportFailure,
            Self::ProtocolMismatch,
            Self::ParseFailure,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
