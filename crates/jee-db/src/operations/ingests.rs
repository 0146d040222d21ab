//! Ingestion log operations.

use super::users::timestamp_column;
use crate::database::Database;
use crate::error::DbResult;
use chrono::{DateTime, Utc};
use rusqlite::params;

/// One processed document.
#[derive(Debug, Clone)]
pub struct IngestRecord {
    pub id: String,
    pub user_email: String,
    pub file_name: String,
    pub content_hash: String,
    pub pages: i64,
    pub chars: i64,
    pub ingested_at: DateTime<Utc>,
}

impl IngestRecord {
    pub fn new(
        user_email: impl Into<String>,
        file_name: impl Into<String>,
        content_hash: impl Into<String>,
        pages: usize,
        chars: usize,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_email: user_email.into(),
            file_name: file_name.into(),
            content_hash: content_hash.into(),
            pages: pages as i64,
            chars: chars as i64,
            ingested_at: Utc::now(),
        }
    }
}

impl Database {
    /// Append a processed document to the log.
    pub fn record_ingest(&self, record: &IngestRecord) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO ingest_log (id, user_email, file_name, content_hash, pages, chars, ingested_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.id,
                record.user_email,
                record.file_name,
                record.content_hash,
                record.pages,
                record.chars,
                record.ingested_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Documents a user has processed, newest first.
    pub fn list_ingests(&self, user_email: &str, limit: i64) -> DbResult<Vec<IngestRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_email, file_name, content_hash, pages, chars, ingested_at
             FROM ingest_log WHERE user_email = ?1
             ORDER BY ingested_at DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_email, limit], |row| {
            Ok(IngestRecord {
                id: row.get(0)?,
                user_email: row.get(1)?,
                file_name: row.get(2)?,
                content_hash: row.get(3)?,
                pages: row.get(4)?,
                chars: row.get(5)?,
                ingested_at: timestamp_column(row, 6)?,
            })
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Total documents processed across all users.
    pub fn count_ingests(&self) -> DbResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM ingest_log", [], |row| row.get(0))?;
        Ok(count)
    }
}
