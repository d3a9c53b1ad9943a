//! Listing pagination crawler
//!
//! Walks the numbered listing pages of one source and collects the detail
//! links they contain. The walk is an explicit state machine (`CrawlState`):
//!
//! ```text
//! FetchingPage(n) --Ok--------> ExtractingLinks --links--> CheckingNext --next--> FetchingPage(n+1)
//!        |  \--Retryable (budget left): back off, refetch n      |                  |
//!        |   \-Retryable (budget spent) --> Abandoned            no links           no next
//!        \--Fatal --> Done                                       v                  v
//!                                                               Done               Done
//! ```
//!
//! Links gathered before an abandonment are kept.

use crate::config::{CrawlerConfig, SiteConfig};
use crate::crawler::budget::{Decision, ErrorBudget};
use crate::crawler::{FetchResult, PageFetcher};
use crate::extract::ListingExtractor;
use crate::state::{CrawlState, Source};
use std::time::Duration;
use url::Url;

/// What one source's listing crawl produced
#[derive(Debug, Clone)]
pub struct SourceCrawl {
    /// Detail links in discovery order
    pub links: Vec<String>,

    /// Listing pages fetched successfully
    pub pages_fetched: u32,

    /// Terminal state (`Done` or `Abandoned`)
    pub state: CrawlState,

    /// Consecutive failures left on the budget when the crawl ended
    pub consecutive_failures: u32,
}

/// Crawls the listing pages of one source at a time
pub struct PaginationCrawler<'a> {
    fetcher: &'a dyn PageFetcher,
    extractor: &'a dyn ListingExtractor,
    site: &'a SiteConfig,
    settings: &'a CrawlerConfig,
    timeout: Duration,
}

impl<'a> PaginationCrawler<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        extractor: &'a dyn ListingExtractor,
        site: &'a SiteConfig,
        settings: &'a CrawlerConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            site,
            settings,
            timeout,
        }
    }

    /// Runs the state machine for `source` until it reaches a terminal state
    ///
    /// Each source gets a fresh error budget, so a source that cannot be
    /// reached does not eat into the budget of the next one.
    pub async fn crawl(&self, source: &Source) -> SourceCrawl {
        let mut budget = ErrorBudget::new(self.settings.max_consecutive_errors);
        let mut state = CrawlState::INITIAL;
        let mut links: Vec<String> = Vec::new();
        let mut pages_fetched = 0;

        let mut page = 1;
        let mut page_url = String::new();
        let mut body = String::new();

        while state.is_active() {
            state = match state {
                CrawlState::FetchingPage(n) => {
                    page = n;
                    page_url = self.site.listing_url(source, n);
                    tracing::info!("[{}] Page {}: {}", source.id, n, page_url);

                    match self.fetcher.fetch(&page_url, self.timeout).await {
                        FetchResult::Ok(fetched) => {
                            budget.record(true);
                            pages_fetched += 1;
                            body = fetched;
                            CrawlState::ExtractingLinks
                        }
                        FetchResult::Retryable(cause) => match budget.record(false) {
                            Decision::Continue => {
                                tracing::warn!(
                                    "[{}] Page {} failed ({}), retrying ({}/{})",
                                    source.id,
                                    n,
                                    cause,
                                    budget.failures(),
                                    budget.ceiling()
                                );
                                self.settings.retry_delay.pause().await;
                                CrawlState::FetchingPage(n)
                            }
                            Decision::Abandon => {
                                tracing::warn!(
                                    "[{}] Too many consecutive errors ({}), last: {}. Skipping source",
                                    source.id,
                                    budget.failures(),
                                    cause
                                );
                                CrawlState::Abandoned
                            }
                        },
                        FetchResult::Fatal(status) => {
                            tracing::info!(
                                "[{}] Page {} returned HTTP {}, treating as end of listing",
                                source.id,
                                n,
                                status
                            );
                            CrawlState::Done
                        }
                    }
                }

                CrawlState::ExtractingLinks => {
                    let found = match Url::parse(&page_url) {
                        Ok(base) => self.extractor.extract_links(&body, &base),
                        Err(e) => {
                            tracing::warn!("[{}] Bad listing URL {}: {}", source.id, page_url, e);
                            Vec::new()
                        }
                    };

                    if found.is_empty() {
                        tracing::info!("[{}] No items found on page {}", source.id, page);
                        CrawlState::Done
                    } else {
                        tracing::debug!(
                            "[{}] {} links on page {}",
                            source.id,
                            found.len(),
                            page
                        );
                        links.extend(found);
                        CrawlState::CheckingNext
                    }
                }

                CrawlState::CheckingNext => {
                    if self.extractor.has_next_page(&body) {
                        self.settings.page_delay.pause().await;
                        CrawlState::FetchingPage(page + 1)
                    } else {
                        CrawlState::Done
                    }
                }

                terminal @ (CrawlState::Done | CrawlState::Abandoned) => terminal,
            };
        }

        tracing::info!(
            "[{}] Listing {} after {} pages: {} links found",
            source.id,
            state,
            pages_fetched,
            links.len()
        );

        SourceCrawl {
            links,
            pages_fetched,
            state,
            consecutive_failures: budget.failures(),
        }
    }
}
