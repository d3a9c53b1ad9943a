//! Storage module for the record checkpoint
//!
//! The checkpoint is the boundary between crawling and downloading: once it
//! exists for a (category, year), crawling is skipped and the stored records
//! feed the download stage directly. This module handles:
//! - The `CheckpointStore` trait and its error type
//! - A CSV table implementation (one row per record)
//! - A SQLite implementation

mod csv_checkpoint;
mod schema;
mod sqlite_checkpoint;
mod traits;

pub use csv_checkpoint::CsvCheckpoint;
pub use sqlite_checkpoint::SqliteCheckpoint;
pub use traits::{CheckpointStore, StorageError, StorageResult};

use crate::config::{CheckpointFormat, Config};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Opens the checkpoint store configured for this run
pub fn open_checkpoint(config: &Config) -> Box<dyn CheckpointStore> {
    let path = config.checkpoint_path();
    match config.output.checkpoint_format {
        CheckpointFormat::Csv => Box::new(CsvCheckpoint::new(path)),
        CheckpointFormat::Sqlite => Box::new(SqliteCheckpoint::new(path)),
    }
}

/// Sibling path a checkpoint is written to before being renamed into place
pub(crate) fn staging_path(path: &Path) -> PathBuf {
    let mut staged = OsString::from(path.as_os_str());
    staged.push(".tmp");
    PathBuf::from(staged)
}

/// Creates the checkpoint's parent directory if needed
pub(crate) fn ensure_parent(path: &Path) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
