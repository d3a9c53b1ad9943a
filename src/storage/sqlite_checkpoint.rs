//! SQLite checkpoint
//!
//! The database is built at a staging path inside a single transaction and
//! renamed into place, so a checkpoint either exists completely or not at all.

use crate::state::{FieldValue, Record};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CheckpointStore, StorageResult};
use crate::storage::{ensure_parent, staging_path};
use chrono::Utc;
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// SQLite database checkpoint
#[derive(Debug, Clone)]
pub struct SqliteCheckpoint {
    path: PathBuf,
}

impl SqliteCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_records(conn: &mut Connection, records: &[Record]) -> rusqlite::Result<()> {
        let tx = conn.transaction()?;
        {
            let mut insert_record = tx.prepare(
                "INSERT INTO records (source_url, source, category, year, document_url)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            let mut insert_field = tx.prepare(
                "INSERT INTO record_fields (record_id, position, name, value)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;

            for record in records {
                let record_id = insert_record.insert(params![
                    record.source_url,
                    record.source,
                    record.category,
                    record.year,
                    record.document_url.as_text(),
                ])?;

                for (position, (name, value)) in record.fields.iter().enumerate() {
                    insert_field.execute(params![
                        record_id,
                        position as i64,
                        name,
                        value.as_text()
                    ])?;
                }
            }

            tx.execute(
                "INSERT INTO checkpoint_info (id, created_at, record_count) VALUES (1, ?1, ?2)",
                params![Utc::now().to_rfc3339(), records.len() as i64],
            )?;
        }
        tx.commit()
    }
}

impl CheckpointStore for SqliteCheckpoint {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StorageResult<Vec<Record>> {
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

        let mut record_stmt = conn.prepare(
            "SELECT id, source_url, source, category, year, document_url
             FROM records ORDER BY id",
        )?;
        let mut field_stmt = conn.prepare(
            "SELECT name, value FROM record_fields WHERE record_id = ?1 ORDER BY position",
        )?;

        let rows = record_stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    Record {
                        source_url: row.get(1)?,
                        fields: Vec::new(),
                        source: row.get(2)?,
                        category: row.get(3)?,
                        year: row.get(4)?,
                        document_url: FieldValue::from_option(row.get(5)?),
                    },
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(rows.len());
        for (record_id, mut record) in rows {
            record.fields = field_stmt
                .query_map(params![record_id], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        FieldValue::from_option(row.get(1)?),
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            records.push(record);
        }

        Ok(records)
    }

    fn save(&self, records: &[Record]) -> StorageResult<()> {
        ensure_parent(&self.path)?;
        let staged = staging_path(&self.path);
        if staged.exists() {
            std::fs::remove_file(&staged)?;
        }

        {
            let mut conn = Connection::open(&staged)?;
            initialize_schema(&conn)?;
            Self::write_records(&mut conn, records)?;
        }

        std::fs::rename(&staged, &self.path)?;
        Ok(())
    }
}
