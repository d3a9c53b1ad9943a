//! Crawler module for listing and detail pages
//!
//! This module contains the sequential crawl stages, including:
//! - HTTP fetching with typed results and User-Agent rotation
//! - Consecutive-failure budgets
//! - The listing pagination state machine
//! - Detail page extraction
//! - Overall run coordination

mod budget;
mod coordinator;
mod detail;
mod fetcher;
mod pagination;

#[cfg(test)]
pub(crate) mod testing;

pub use budget::{Decision, ErrorBudget, SharedErrorBudget};
pub use coordinator::{run_harvest, Components, Coordinator, RunOptions};
pub use detail::{DetailStage, SourceDetails};
pub use fetcher::{
    build_http_client, classify_status, describe_transport_error, is_retryable_status,
    FetchResult, HttpFetcher, PageFetcher, RetryCause, UserAgentPool,
};
pub use pagination::{PaginationCrawler, SourceCrawl};
