//! Download stage
//!
//! Turns records into download tasks and fetches their documents into the
//! archive directory with a bounded worker pool:
//! - `task`: filename derivation and URL validation
//! - `fetcher`: the document fetcher and its retry policy
//! - `manager`: planning, the worker pool and atomic writes

mod fetcher;
mod manager;
mod task;

pub use fetcher::{DocumentFetcher, DownloadError, HttpDocumentFetcher, RetryPolicy};
pub use manager::{DownloadManager, DownloadPlan, BUDGET_EXHAUSTED};
pub use task::{document_extension, parse_document_url, sanitize_identifier, DownloadTask};
