/// Listing crawl state definitions
///
/// This module defines every state a single source's listing crawl can be in.
use std::fmt;

/// Represents the current state of one source's pagination crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    // ===== Active States =====
    /// Fetching the given (1-based) listing page
    FetchingPage(u32),

    /// Applying the listing extractor to the page just fetched
    ExtractingLinks,

    /// Looking for a next-page indicator
    CheckingNext,

    // ===== Terminal States =====
    /// No more pages: empty page, no next indicator, or a fatal status
    Done,

    /// The source's error budget ran out while retrying a page
    Abandoned,
}

impl CrawlState {
    /// The state every source crawl starts in
    pub const INITIAL: CrawlState = CrawlState::FetchingPage(1);

    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Abandoned)
    }

    /// Returns true if the crawl is still making progress
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the source was given up on
    pub fn is_abandoned(&self) -> bool {
        matches!(self, Self::Abandoned)
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchingPage(page) => write!(f, "fetching page {}", page),
            Self::ExtractingLinks => write!(f, "extracting links"),
            Self::CheckingNext => write!(f, "checking next page"),
            Self::Done => write!(f, "done"),
            Self::Abandoned => write!(f, "abandoned"),
        }
    }
}
