//! Append-only run log
//!
//! One file per run under the log directory, named
//! `download_<category>_<year>_<timestamp>.log`. Each outcome is written and
//! flushed as soon as it is known, so the log stays useful after a crash.

use crate::output::report::RunReport;
use crate::state::{Outcome, TaskOutcome};
use chrono::{Local, Utc};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub struct RunLog {
    path: PathBuf,
    file: File,
}

impl RunLog {
    /// Creates the log file and writes its header
    pub fn create(
        log_dir: &Path,
        category: &str,
        year: u16,
        config_hash: &str,
    ) -> io::Result<Self> {
        std::fs::create_dir_all(log_dir)?;

        let name = format!(
            "download_{}_{}_{}.log",
            category,
            year,
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = log_dir.join(name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let mut log = Self { path, file };
        writeln!(log.file, "# run started {}", Utc::now().to_rfc3339())?;
        writeln!(log.file, "# category={} year={}", category, year)?;
        if !config_hash.is_empty() {
            writeln!(log.file, "# config {}", config_hash)?;
        }
        log.file.flush()?;

        tracing::info!("Run log: {}", log.path.display());
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one outcome line: timestamp, status, identifier, detail
    pub fn record(&mut self, task: &TaskOutcome) -> io::Result<()> {
        let detail = match &task.outcome {
            Outcome::Ok(path) => path.display().to_string(),
            Outcome::Failed(reason) | Outcome::Skipped(reason) => reason.clone(),
        };
        writeln!(
            self.file,
            "{}\t{}\t{}\t{}",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            task.outcome.label(),
            task.identifier,
            detail
        )?;
        self.file.flush()
    }

    /// Appends the trailing summary block
    pub fn summary(&mut self, report: &RunReport) -> io::Result<()> {
        writeln!(self.file, "# ---")?;
        writeln!(self.file, "# {}", report.summary_line())?;
        writeln!(self.file, "# elapsed {:.2} minutes", report.elapsed_minutes())?;
        writeln!(self.file, "# run finished {}", Utc::now().to_rfc3339())?;
        self.file.flush()
    }
}
