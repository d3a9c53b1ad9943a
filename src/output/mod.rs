//! Output module for run reporting
//!
//! This module handles:
//! - Crawl-stage statistics
//! - The append-only run log, one line per download outcome
//! - The end-of-run console report

mod report;
mod run_log;
pub mod stats;

pub use report::{print_report, RunReport};
pub use run_log::RunLog;
pub use stats::{print_statistics, CrawlStats};
