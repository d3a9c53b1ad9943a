//! CSV checkpoint
//!
//! One row per record. Columns are `source_url`, the detail fields in the
//! order they were first seen, then `category`, `year`, `source` and
//! `document_url`. Missing values are written as `N/A`.

use crate::state::{FieldValue, Record};
use crate::storage::traits::{CheckpointStore, StorageError, StorageResult};
use crate::storage::{ensure_parent, staging_path};
use std::path::{Path, PathBuf};

/// CSV table checkpoint
#[derive(Debug, Clone)]
pub struct CsvCheckpoint {
    path: PathBuf,
}

impl CsvCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn corrupt(&self, message: impl Into<String>) -> StorageError {
        StorageError::Corrupt {
            path: self.path.display().to_string(),
            message: message.into(),
        }
    }
}

/// Field names across all records, in first-seen order
fn field_columns(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for name in record.field_names() {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
    }
    columns
}

impl CheckpointStore for CsvCheckpoint {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StorageResult<Vec<Record>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let headers = reader.headers()?.clone();

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| self.corrupt(format!("missing column '{}'", name)))
        };
        let url_col = column("source_url")?;
        let category_col = column("category")?;
        let year_col = column("year")?;
        let source_col = column("source")?;
        let document_col = column("document_url")?;

        let reserved = [url_col, category_col, year_col, source_col, document_col];
        let field_cols: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(index, _)| !reserved.contains(index))
            .map(|(index, name)| (index, name.to_string()))
            .collect();

        let mut records = Vec::new();
        for (line, row) in reader.records().enumerate() {
            let row = row?;
            let cell = |index: usize| row.get(index).unwrap_or_default();

            let year = cell(year_col).parse::<u16>().map_err(|_| {
                self.corrupt(format!("row {}: bad year '{}'", line + 1, cell(year_col)))
            })?;

            records.push(Record {
                source_url: cell(url_col).to_string(),
                fields: field_cols
                    .iter()
                    .map(|(index, name)| (name.clone(), FieldValue::from_cell(cell(*index))))
                    .collect(),
                source: cell(source_col).to_string(),
                category: cell(category_col).to_string(),
                year,
                document_url: FieldValue::from_cell(cell(document_col)),
            });
        }

        Ok(records)
    }

    fn save(&self, records: &[Record]) -> StorageResult<()> {
        ensure_parent(&self.path)?;
        let staged = staging_path(&self.path);
        let columns = field_columns(records);

        {
            let mut writer = csv::Writer::from_path(&staged)?;

            let mut header = vec!["source_url".to_string()];
            header.extend(columns.iter().cloned());
            header.extend(
                ["category", "year", "source", "document_url"]
                    .iter()
                    .map(|s| s.to_string()),
            );
            writer.write_record(&header)?;

            for record in records {
                let mut row = vec![record.source_url.clone()];
                row.extend(columns.iter().map(|name| record.field(name).to_string()));
                row.push(record.category.clone());
                row.push(record.year.to_string());
                row.push(record.source.clone());
                row.push(record.document_url.to_string());
                writer.write_record(&row)?;
            }

            writer.flush()?;
        }

        std::fs::rename(&staged, &self.path)?;
        Ok(())
    }
}
