//! Crawl-stage statistics
//!
//! Accumulated while the sources are crawled and printed with the run report.

use crate::crawler::{SourceCrawl, SourceDetails};
use crate::state::Source;

/// What the crawl stage produced across all sources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Number of sources crawled
    pub sources: usize,

    /// Sources whose listing crawl was abandoned on its error budget
    pub sources_abandoned: Vec<String>,

    /// Listing pages fetched successfully
    pub pages: u32,

    /// Detail links found on listing pages
    pub links: usize,

    /// Records extracted, or loaded from the checkpoint
    pub records: usize,

    /// Detail pages that could not be fetched
    pub detail_failures: u32,

    /// Records came from an existing checkpoint; nothing was crawled
    pub from_checkpoint: bool,
}

impl CrawlStats {
    /// Stats for a run that skipped crawling
    pub fn from_checkpoint(records: usize) -> Self {
        Self {
            records,
            from_checkpoint: true,
            ..Self::default()
        }
    }

    /// Folds in the result of one source
    pub fn add_source(&mut self, source: &Source, crawl: &SourceCrawl, details: &SourceDetails) {
        self.sources += 1;
        if crawl.state.is_abandoned() {
            self.sources_abandoned.push(source.id.clone());
        }
        self.pages += crawl.pages_fetched;
        self.links += crawl.links.len();
        self.records += details.records.len();
        self.detail_failures += details.failures;
    }
}

/// Prints crawl statistics to stdout
pub fn print_statistics(stats: &CrawlStats) {
    println!("Crawl:");
    if stats.from_checkpoint {
        println!("  Loaded {} records from checkpoint", stats.records);
        return;
    }

    println!("  Sources crawled: {}", stats.sources);
    if !stats.sources_abandoned.is_empty() {
        println!(
            "  Sources abandoned ({}): {}",
            stats.sources_abandoned.len(),
            stats.sources_abandoned.join(", ")
        );
    }
    println!("  Listing pages: {}", stats.pages);
    println!("  Detail links: {}", stats.links);
    println!("  Records extracted: {}", stats.records);
    if stats.detail_failures > 0 {
        println!("  Detail pages failed: {}", stats.detail_failures);
    }
}
