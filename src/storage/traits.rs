//! Checkpoint trait and error types

use crate::state::Record;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt checkpoint {path}: {message}")]
    Corrupt { path: String, message: String },
}

/// Result type for checkpoint operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persisted record collection for one (category, year) run
///
/// Written once when crawling completes. Its presence decides whether the
/// next run crawls or loads.
pub trait CheckpointStore: Send + Sync {
    /// Location of the checkpoint artifact
    fn path(&self) -> &Path;

    /// Whether a completed checkpoint is present
    fn exists(&self) -> StorageResult<bool> {
        Ok(self.path().is_file())
    }

    /// Loads every record, in the order they were saved
    fn load(&self) -> StorageResult<Vec<Record>>;

    /// Writes all records, replacing any previous checkpoint atomically
    fn save(&self, records: &[Record]) -> StorageResult<()>;

    /// Deletes the checkpoint so the next run crawls again
    fn remove(&self) -> StorageResult<()> {
        match std::fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
