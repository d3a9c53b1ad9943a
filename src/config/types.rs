use crate::state::Source;
use rand::Rng;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Putusan-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub run: RunConfig,
    pub site: SiteConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub template: TemplateConfig,
}

impl Config {
    /// Builds the list of sources to crawl, in configuration order
    pub fn sources(&self) -> Vec<Source> {
        self.run
            .sources
            .iter()
            .map(|id| Source {
                id: id.clone(),
                category: self.run.category.clone(),
                year: self.run.year,
                directory: self.run.directory.clone(),
            })
            .collect()
    }

    /// Path of the checkpoint artifact for this run's (category, year)
    pub fn checkpoint_path(&self) -> PathBuf {
        let extension = match self.output.checkpoint_format {
            CheckpointFormat::Csv => "csv",
            CheckpointFormat::Sqlite => "db",
        };
        self.output.checkpoint_dir.join(format!(
            "records_{}_{}.{}",
            self.run.category, self.run.year, extension
        ))
    }
}

/// What to harvest: one listing per source, sharing category and year
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Source identifiers (court codes), crawled in order
    pub sources: Vec<String>,

    /// Listing category (e.g. "regis" or "putus")
    pub category: String,

    /// Listing year
    pub year: u16,

    /// Directory path segment (e.g. "perdata-agama")
    pub directory: String,
}

/// Remote site layout
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Listing page URL with `{source}`, `{directory}`, `{category}`,
    /// `{year}` and `{page}` placeholders
    #[serde(rename = "listing-url-template")]
    pub listing_url_template: String,
}

impl SiteConfig {
    /// Expands the listing template for one source and page number
    pub fn listing_url(&self, source: &Source, page: u32) -> String {
        self.listing_url_template
            .replace("{source}", &source.id)
            .replace("{directory}", &source.directory)
            .replace("{category}", &source.category)
            .replace("{year}", &source.year.to_string())
            .replace("{page}", &page.to_string())
    }
}

/// HTTP identity and timeouts
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent strings sampled per request
    #[serde(rename = "user-agents", default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Timeout for listing and detail page requests (seconds)
    #[serde(rename = "page-timeout-secs", default = "default_page_timeout")]
    pub page_timeout_secs: u64,

    /// Timeout for a single document download request (seconds)
    #[serde(rename = "download-timeout-secs", default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// TCP connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl HttpConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agents: default_user_agents(),
            page_timeout_secs: default_page_timeout(),
            download_timeout_secs: default_download_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Listing and detail crawl behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Consecutive failures tolerated per source before it is abandoned
    #[serde(rename = "max-consecutive-errors", default = "default_max_errors")]
    pub max_consecutive_errors: u32,

    /// Backoff after a retryable listing failure
    #[serde(rename = "retry-delay", default = "default_retry_delay")]
    pub retry_delay: DelayRange,

    /// Pause between successive listing pages
    #[serde(rename = "page-delay", default = "default_page_delay")]
    pub page_delay: DelayRange,

    /// Pause after every detail page fetch
    #[serde(rename = "detail-delay", default = "default_detail_delay")]
    pub detail_delay: DelayRange,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_consecutive_errors: default_max_errors(),
            retry_delay: default_retry_delay(),
            page_delay: default_page_delay(),
            detail_delay: default_detail_delay(),
        }
    }
}

/// Document download behavior
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    /// Number of concurrent download workers
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Transport-level retries per document
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Linear backoff step between transport retries (milliseconds)
    #[serde(rename = "backoff-factor-ms", default = "default_backoff_factor")]
    pub backoff_factor_ms: u64,

    /// Consecutive failed documents across the pool before the remaining
    /// tasks are failed without a request
    #[serde(
        rename = "max-consecutive-failures",
        default = "default_max_errors"
    )]
    pub max_consecutive_failures: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            max_retries: default_max_retries(),
            backoff_factor_ms: default_backoff_factor(),
            max_consecutive_failures: default_max_errors(),
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding the record checkpoint
    #[serde(rename = "checkpoint-dir")]
    pub checkpoint_dir: PathBuf,

    /// Checkpoint table format
    #[serde(rename = "checkpoint-format", default)]
    pub checkpoint_format: CheckpointFormat,

    /// Directory receiving downloaded documents
    #[serde(rename = "archive-dir")]
    pub archive_dir: PathBuf,

    /// Directory receiving run logs
    #[serde(rename = "log-dir")]
    pub log_dir: PathBuf,
}

/// Checkpoint table format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointFormat {
    #[default]
    Csv,
    Sqlite,
}

/// Selectors and labels describing the directory's page markup
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateConfig {
    /// Anchors on a listing page that point at detail pages
    #[serde(rename = "link-selector", default = "default_link_selector")]
    pub link_selector: String,

    /// Element whose presence means another listing page follows
    #[serde(rename = "next-page-selector", default = "default_next_selector")]
    pub next_page_selector: String,

    /// Table cells scanned for field labels on a detail page
    #[serde(rename = "label-cell-selector", default = "default_label_selector")]
    pub label_cell_selector: String,

    /// Anchor text suffix identifying the document link
    #[serde(rename = "document-link-suffix", default = "default_document_suffix")]
    pub document_link_suffix: String,

    /// Field used to name downloaded documents
    #[serde(rename = "identifier-field", default = "default_identifier_field")]
    pub identifier_field: String,

    /// Detail fields, in column order
    #[serde(default = "default_fields")]
    pub fields: Vec<FieldEntry>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            link_selector: default_link_selector(),
            next_page_selector: default_next_selector(),
            label_cell_selector: default_label_selector(),
            document_link_suffix: default_document_suffix(),
            identifier_field: default_identifier_field(),
            fields: default_fields(),
        }
    }
}

/// A detail field read from the cell following its label cell
#[derive(Debug, Clone, Deserialize)]
pub struct FieldEntry {
    /// Column name in the checkpoint
    pub name: String,

    /// Label text as it appears on the page
    pub label: String,
}

/// A randomized delay in milliseconds, sampled uniformly from `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DelayRange {
    #[serde(rename = "min-ms")]
    pub min_ms: u64,

    #[serde(rename = "max-ms")]
    pub max_ms: u64,
}

impl DelayRange {
    pub const ZERO: DelayRange = DelayRange {
        min_ms: 0,
        max_ms: 0,
    };

    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Draws one jittered duration from the range
    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::rng().random_range(self.min_ms..=self.max_ms))
    }

    /// Sleeps for one sampled duration
    pub async fn pause(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:118.0) Gecko/20100101 Firefox/118.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/115.0.0.0 Safari/537.36",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/122.0.0.0 Safari/537.36",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_page_timeout() -> u64 {
    600
}

fn default_download_timeout() -> u64 {
    3600
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_max_errors() -> u32 {
    100
}

fn default_retry_delay() -> DelayRange {
    DelayRange::new(5_000, 10_000)
}

fn default_page_delay() -> DelayRange {
    DelayRange::new(2_000, 4_000)
}

fn default_detail_delay() -> DelayRange {
    DelayRange::new(2_500, 5_000)
}

fn default_workers() -> u32 {
    15
}

fn default_max_retries() -> u32 {
    10
}

fn default_backoff_factor() -> u64 {
    1_000
}

fn default_link_selector() -> String {
    ".entry-c strong a".to_string()
}

fn default_next_selector() -> String {
    r#".pagination a[rel="next"]"#.to_string()
}

fn default_label_selector() -> String {
    "td".to_string()
}

fn default_document_suffix() -> String {
    ".pdf".to_string()
}

fn default_identifier_field() -> String {
    "case_number".to_string()
}

fn default_fields() -> Vec<FieldEntry> {
    [
        ("case_number", "Nomor"),
        ("classification", "Klasifikasi"),
        ("keywords", "Kata Kunci"),
        ("registration_date", "Tanggal Register"),
        ("issuing_body", "Lembaga Peradilan"),
    ]
    .iter()
    .map(|(name, label)| FieldEntry {
        name: name.to_string(),
        label: label.to_string(),
    })
    .collect()
}
