//! End-of-run report

use crate::output::stats::{print_statistics, CrawlStats};
use crate::state::Outcome;
use std::path::PathBuf;
use std::time::Duration;

/// Tally of a whole run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub crawl: CrawlStats,
    pub ok: usize,
    pub failed: usize,
    pub skipped: usize,
    pub elapsed: Duration,
    pub checkpoint_path: PathBuf,

    /// `None` when the run stopped before downloading
    pub log_path: Option<PathBuf>,
}

impl RunReport {
    pub fn new(crawl: CrawlStats, checkpoint_path: PathBuf) -> Self {
        Self {
            crawl,
            checkpoint_path,
            ..Self::default()
        }
    }

    pub fn tally(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Ok(_) => self.ok += 1,
            Outcome::Failed(_) => self.failed += 1,
            Outcome::Skipped(_) => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.ok + self.failed + self.skipped
    }

    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed.as_secs_f64() / 60.0
    }

    /// One-line summary used in the run log and the console
    pub fn summary_line(&self) -> String {
        format!(
            "total={} ok={} failed={} skipped={}",
            self.total(),
            self.ok,
            self.failed,
            self.skipped
        )
    }
}

/// Prints the report to stdout
pub fn print_report(report: &RunReport) {
    println!("=== Harvest Report ===\n");

    print_statistics(&report.crawl);
    println!("  Checkpoint: {}", report.checkpoint_path.display());
    println!();

    match &report.log_path {
        Some(log_path) => {
            println!("Downloads:");
            println!("  Total: {}", report.total());
            println!("  OK: {}", report.ok);
            println!("  Failed: {}", report.failed);
            println!("  Skipped: {}", report.skipped);
            println!("  Run log: {}", log_path.display());
        }
        None => println!("Downloads: not run"),
    }
    println!();

    println!("Elapsed: {:.2} minutes", report.elapsed_minutes());
}
