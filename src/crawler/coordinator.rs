//! Harvest coordinator - main run orchestration logic
//!
//! This module ties the stages together for one (category, year) run:
//! - Crawling every configured source (listing pages, then detail pages)
//! - Gating the crawl on the record checkpoint
//! - Driving the download manager over the collected records
//! - Writing the run log and building the final report

use crate::config::Config;
use crate::crawler::{DetailStage, HttpFetcher, PageFetcher, PaginationCrawler};
use crate::download::{DocumentFetcher, DownloadManager, HttpDocumentFetcher};
use crate::extract::{DetailExtractor, ListingExtractor, SiteTemplate};
use crate::output::{CrawlStats, RunLog, RunReport};
use crate::state::Record;
use crate::storage::{open_checkpoint, CheckpointStore};
use crate::Result;
use std::sync::Arc;
use std::time::Instant;

/// How a run should treat existing state and where it should stop
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Delete the checkpoint first so the sources are crawled again
    pub fresh: bool,

    /// Stop once the checkpoint is written
    pub crawl_only: bool,

    /// Hash of the configuration file, written to the run log
    pub config_hash: String,
}

/// Everything the coordinator talks to
pub struct Components {
    pub pages: Arc<dyn PageFetcher>,
    pub documents: Arc<dyn DocumentFetcher>,
    pub listing: Arc<dyn ListingExtractor>,
    pub detail: Arc<dyn DetailExtractor>,
    pub checkpoint: Box<dyn CheckpointStore>,
}

impl Components {
    /// HTTP fetchers, the configured site template and checkpoint store
    pub fn from_config(config: &Config) -> Result<Self> {
        let template = Arc::new(SiteTemplate::from_config(&config.template)?);

        Ok(Self {
            pages: Arc::new(HttpFetcher::from_config(&config.http)?),
            documents: Arc::new(HttpDocumentFetcher::from_config(
                &config.http,
                &config.download,
            )?),
            listing: template.clone(),
            detail: template,
            checkpoint: open_checkpoint(config),
        })
    }
}

/// Main harvest coordinator structure
pub struct Coordinator {
    config: Config,
    components: Components,
}

impl Coordinator {
    /// Creates a coordinator wired to the network
    pub fn new(config: Config) -> Result<Self> {
        let components = Components::from_config(&config)?;
        Ok(Self::with_components(config, components))
    }

    pub fn with_components(config: Config, components: Components) -> Self {
        Self { config, components }
    }

    /// Crawls every source in order
    ///
    /// Each source walks its listing pages and then its detail pages before
    /// the next source starts. An abandoned source keeps whatever it found.
    pub async fn crawl_sources(&self) -> (Vec<Record>, CrawlStats) {
        let page_timeout = self.config.http.page_timeout();
        let crawler = PaginationCrawler::new(
            self.components.pages.as_ref(),
            self.components.listing.as_ref(),
            &self.config.site,
            &self.config.crawler,
            page_timeout,
        );
        let details = DetailStage::new(
            self.components.pages.as_ref(),
            self.components.detail.as_ref(),
            &self.config.crawler,
            page_timeout,
        );

        let mut records = Vec::new();
        let mut stats = CrawlStats::default();

        for source in self.config.sources() {
            tracing::info!("Crawling source {}", source.id);

            let crawl = crawler.crawl(&source).await;
            let extracted = details.extract_all(&source, &crawl.links).await;
            tracing::info!(
                "[{}] {} records, {} detail pages failed",
                source.id,
                extracted.records.len(),
                extracted.failures
            );

            stats.add_source(&source, &crawl, &extracted);
            records.extend(extracted.records);
        }

        (records, stats)
    }

    /// Loads the checkpoint if there is one, otherwise crawls and writes it
    ///
    /// A crawl that yields no records writes no checkpoint, so the next run
    /// crawls again instead of resuming from an empty table.
    pub async fn collect_records(&self) -> Result<(Vec<Record>, CrawlStats)> {
        let checkpoint = self.components.checkpoint.as_ref();

        if checkpoint.exists()? {
            let records = checkpoint.load()?;
            tracing::info!(
                "Checkpoint {} found, skipping crawl ({} records)",
                checkpoint.path().display(),
                records.len()
            );
            let stats = CrawlStats::from_checkpoint(records.len());
            return Ok((records, stats));
        }

        let (records, stats) = self.crawl_sources().await;

        if records.is_empty() {
            tracing::warn!("No records extracted, checkpoint not written");
        } else {
            checkpoint.save(&records)?;
            tracing::info!(
                "Saved {} records to {}",
                records.len(),
                checkpoint.path().display()
            );
        }

        Ok((records, stats))
    }

    /// Runs the whole pipeline
    pub async fn run(&self, options: &RunOptions) -> Result<RunReport> {
        let started = Instant::now();
        let checkpoint = self.components.checkpoint.as_ref();

        if options.fresh {
            tracing::info!("Removing checkpoint {}", checkpoint.path().display());
            checkpoint.remove()?;
        }

        let (records, crawl) = self.collect_records().await?;
        let mut report = RunReport::new(crawl, checkpoint.path().to_path_buf());

        if options.crawl_only {
            tracing::info!("Crawl only, skipping downloads");
            report.elapsed = started.elapsed();
            return Ok(report);
        }

        let mut log = RunLog::create(
            &self.config.output.log_dir,
            &self.config.run.category,
            self.config.run.year,
            &options.config_hash,
        )?;

        let manager = DownloadManager::new(Arc::clone(&self.components.documents), &self.config);
        manager
            .run(&records, |task| {
                report.tally(&task.outcome);
                log.record(task)?;
                Ok(())
            })
            .await?;

        report.elapsed = started.elapsed();
        log.summary(&report)?;
        report.log_path = Some(log.path().to_path_buf());

        tracing::info!(
            "Harvest finished in {:.2} minutes: {}",
            report.elapsed_minutes(),
            report.summary_line()
        );

        Ok(report)
    }
}

/// Runs a complete harvest with networked components
pub async fn run_harvest(config: Config, options: RunOptions) -> Result<RunReport> {
    Coordinator::new(config)?.run(&options).await
}
