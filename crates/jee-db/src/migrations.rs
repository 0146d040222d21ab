//! Schema steps, tracked through SQLite's `user_version` pragma.

use crate::error::{DbError, DbResult};
use rusqlite::Connection;
use tracing::info;

/// Step `n` moves the schema from version `n` to `n + 1`.
const STEPS: &[&str] = &[
    // 0 -> 1: user registry and the per-user ingest log
    r#"
    CREATE TABLE IF NOT EXISTS users (
        email TEXT PRIMARY KEY,
        name TEXT NOT NULL DEFAULT '',
        picture TEXT,
        created_at TEXT NOT NULL,
        last_login_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS ingest_log (
        id TEXT PRIMARY KEY,
        user_email TEXT NOT NULL,
        file_name TEXT NOT NULL,
        content_hash TEXT NOT NULL,
        pages INTEGER NOT NULL,
        chars INTEGER NOT NULL,
        ingested_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_ingest_user ON ingest_log(user_email);
    CREATE INDEX IF NOT EXISTS idx_ingest_hash ON ingest_log(content_hash);
    "#,
];

fn target_version() -> usize {
    STEPS.len()
}

/// Apply every step the database has not seen yet.
pub fn initialize_schema(conn: &Connection) -> DbResult<()> {
    let found = user_version(conn)?;
    let target = target_version();

    if found > target {
        return Err(DbError::Migration(format!(
            "database is at version {found}, this build knows up to {target}"
        )));
    }

    for (version, sql) in STEPS.iter().enumerate().skip(found) {
        info!("Applying schema step {} -> {}", version, version + 1);
        conn.execute_batch(sql)?;
        conn.pragma_update(None, "user_version", (version + 1) as i64)?;
    }

    Ok(())
}

fn user_version(conn: &Connection) -> DbResult<usize> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    usize::try_from(version)
        .map_err(|_| DbError::Migration(format!("negative schema version {version}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();
        assert_eq!(user_version(&conn).unwrap(), target_version());
    }

    #[test]
    fn test_rejects_newer_schema() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", (target_version() + 1) as i64)
            .unwrap();
        assert!(matches!(
            initialize_schema(&conn),
            Err(DbError::Migration(_))
        ));
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'ingest_log')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }
}
