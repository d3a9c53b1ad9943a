//! Concurrent, resumable download manager
//!
//! Tasks whose document is already in the archive are resolved up front and
//! never reach the network, which is what makes reruns resume where the
//! previous run stopped. The rest go to a worker pool bounded by a semaphore.
//! Documents are written to a `.part` sibling and renamed into place, so an
//! interrupted run never leaves a truncated file under a final name.

use crate::config::Config;
use crate::crawler::{Decision, SharedErrorBudget};
use crate::download::{DocumentFetcher, DownloadTask};
use crate::state::{Outcome, Record, TaskOutcome};
use crate::{HarvestError, Result};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Reason given to tasks that never ran because the pool's budget ran out
pub const BUDGET_EXHAUSTED: &str = "error budget exhausted";

/// Records split into work for the pool and outcomes known without it
#[derive(Debug, Default)]
pub struct DownloadPlan {
    pub pending: Vec<DownloadTask>,
    pub resolved: Vec<TaskOutcome>,
}

pub struct DownloadManager {
    fetcher: Arc<dyn DocumentFetcher>,
    archive_dir: PathBuf,
    identifier_field: String,
    workers: usize,
    budget: Arc<SharedErrorBudget>,
}

impl DownloadManager {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, config: &Config) -> Self {
        Self {
            fetcher,
            archive_dir: config.output.archive_dir.clone(),
            identifier_field: config.template.identifier_field.clone(),
            workers: config.download.workers.max(1) as usize,
            budget: Arc::new(SharedErrorBudget::new(
                config.download.max_consecutive_failures,
            )),
        }
    }

    /// Builds a task per record and resolves the ones that need no request
    ///
    /// Listings may link the same decision more than once. Only the first
    /// record for a given archive file becomes a task; the rest are skipped.
    pub fn plan(&self, records: &[Record]) -> DownloadPlan {
        let mut plan = DownloadPlan::default();
        let mut claimed = HashSet::new();

        for record in records {
            match DownloadTask::from_record(record, &self.identifier_field, &self.archive_dir) {
                None => plan.resolved.push(TaskOutcome::new(
                    record.source_url.clone(),
                    Outcome::Skipped(Outcome::MISSING_IDENTIFIER.to_string()),
                )),
                Some(task) if task.is_done() => plan.resolved.push(TaskOutcome::new(
                    task.identifier,
                    Outcome::Skipped(Outcome::FILE_EXISTS.to_string()),
                )),
                Some(task) if !claimed.insert(task.target.clone()) => {
                    tracing::debug!("{} listed more than once", task.identifier);
                    plan.resolved.push(TaskOutcome::new(
                        task.identifier,
                        Outcome::Skipped(Outcome::DUPLICATE_IDENTIFIER.to_string()),
                    ))
                }
                Some(task) => plan.pending.push(task),
            }
        }

        plan
    }

    /// Downloads the documents of `records`
    ///
    /// `on_outcome` sees every outcome as it is produced, in completion
    /// order. An error from it, or a failure to write into the archive,
    /// stops the run; workers still in flight are aborted.
    pub async fn run<F>(
        &self,
        records: &[Record],
        mut on_outcome: F,
    ) -> Result<Vec<TaskOutcome>>
    where
        F: FnMut(&TaskOutcome) -> Result<()>,
    {
        tokio::fs::create_dir_all(&self.archive_dir)
            .await
            .map_err(|source| HarvestError::Archive {
                path: self.archive_dir.display().to_string(),
                source,
            })?;

        let plan = self.plan(records);
        tracing::info!(
            "{} documents to download, {} resolved without a request, {} workers",
            plan.pending.len(),
            plan.resolved.len(),
            self.workers
        );

        let mut outcomes = Vec::with_capacity(records.len());
        for outcome in plan.resolved {
            on_outcome(&outcome)?;
            outcomes.push(outcome);
        }

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut workers = JoinSet::new();
        for task in plan.pending {
            let semaphore = Arc::clone(&semaphore);
            let fetcher = Arc::clone(&self.fetcher);
            let budget = Arc::clone(&self.budget);

            workers.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                process_task(fetcher.as_ref(), &budget, task).await
            });
        }

        let total = records.len();
        while let Some(joined) = workers.join_next().await {
            let outcome = joined??;
            let position = outcomes.len() + 1;
            let (id, result) = (&outcome.identifier, &outcome.outcome);
            if result.is_failed() {
                tracing::warn!("[{}/{}] {}: {}", position, total, id, result);
            } else {
                tracing::info!("[{}/{}] {}: {}", position, total, id, result);
            }
            on_outcome(&outcome)?;
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

/// Runs one task to its outcome
///
/// Only archive write errors are returned as `Err`; everything else is an
/// `Outcome`.
async fn process_task(
    fetcher: &dyn DocumentFetcher,
    budget: &SharedErrorBudget,
    task: DownloadTask,
) -> Result<TaskOutcome> {
    let url = match &task.url {
        Some(url) => url.as_str(),
        None => {
            return Ok(TaskOutcome::new(
                task.identifier,
                Outcome::Skipped(Outcome::INVALID_URL.to_string()),
            ))
        }
    };

    if task.is_done() {
        return Ok(TaskOutcome::new(
            task.identifier,
            Outcome::Skipped(Outcome::FILE_EXISTS.to_string()),
        ));
    }

    if budget.is_exhausted() {
        return Ok(TaskOutcome::new(
            task.identifier,
            Outcome::Failed(BUDGET_EXHAUSTED.to_string()),
        ));
    }

    let outcome = match fetcher.fetch(url).await {
        Ok(body) => {
            write_atomically(&task.target, &body).await?;
            budget.record(true);
            Outcome::Ok(task.target.clone())
        }
        Err(e) => {
            if budget.record(false) == Decision::Abandon {
                tracing::error!(
                    "{} consecutive download failures, remaining downloads will be skipped",
                    budget.failures()
                );
            }
            Outcome::Failed(e.to_string())
        }
    };

    Ok(TaskOutcome::new(task.identifier, outcome))
}

fn part_path(target: &Path) -> PathBuf {
    let mut part = OsString::from(target.as_os_str());
    part.push(".part");
    PathBuf::from(part)
}

/// Writes `body` next to `target` and renames it into place
///
/// On failure the `.part` file is removed so nothing partial stays behind.
async fn write_atomically(target: &Path, body: &[u8]) -> Result<()> {
    let part = part_path(target);
    let written = match tokio::fs::write(&part, body).await {
        Ok(()) => tokio::fs::rename(&part, target).await,
        Err(e) => Err(e),
    };

    if let Err(source) = written {
        if let Err(e) = tokio::fs::remove_file(&part).await {
            tracing::debug!("Could not remove {}: {}", part.display(), e);
        }
        return Err(HarvestError::Archive {
            path: target.display().to_string(),
            source,
        });
    }
    Ok(())
}
