//! Detail page stage
//!
//! Fetches every detail link of a source, one at a time, and turns each page
//! into a `Record`. A failed page only skips that record. A jittered pause
//! follows every request, successful or not, since it is what keeps the
//! remote service from rate limiting the run.

use crate::config::CrawlerConfig;
use crate::crawler::budget::{Decision, ErrorBudget};
use crate::crawler::{FetchResult, PageFetcher};
use crate::extract::DetailExtractor;
use crate::state::{Record, RecordContext, Source};
use std::time::Duration;

/// Records extracted for one source
#[derive(Debug, Clone, Default)]
pub struct SourceDetails {
    pub records: Vec<Record>,

    /// Detail pages that could not be fetched
    pub failures: u32,

    /// Whether the detail budget ran out before every link was visited
    pub abandoned: bool,
}

pub struct DetailStage<'a> {
    fetcher: &'a dyn PageFetcher,
    extractor: &'a dyn DetailExtractor,
    settings: &'a CrawlerConfig,
    timeout: Duration,
}

impl<'a> DetailStage<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        extractor: &'a dyn DetailExtractor,
        settings: &'a CrawlerConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            settings,
            timeout,
        }
    }

    /// Extracts a record from each link, in order
    pub async fn extract_all(&self, source: &Source, links: &[String]) -> SourceDetails {
        let mut budget = ErrorBudget::new(self.settings.max_consecutive_errors);
        let mut details = SourceDetails::default();
        let total = links.len();

        for (index, link) in links.iter().enumerate() {
            tracing::info!("[{}] [{}/{}] Detail: {}", source.id, index + 1, total, link);

            let failure = match self.fetcher.fetch(link, self.timeout).await {
                FetchResult::Ok(body) => {
                    budget.record(true);
                    let context = RecordContext { source, url: link };
                    details
                        .records
                        .push(self.extractor.extract_record(&body, &context));
                    None
                }
                FetchResult::Retryable(cause) => Some(cause.to_string()),
                FetchResult::Fatal(status) => Some(format!("HTTP {}", status)),
            };

            if let Some(reason) = failure {
                details.failures += 1;
                tracing::warn!("[{}] Skipping detail {}: {}", source.id, link, reason);

                if budget.record(false) == Decision::Abandon {
                    tracing::warn!(
                        "[{}] Too many consecutive detail failures, skipping remaining {} links",
                        source.id,
                        total - index - 1
                    );
                    details.abandoned = true;
                    break;
                }
            }

            self.settings.detail_delay.pause().await;
        }

        details
    }
}
