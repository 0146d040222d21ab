//! Pooled SQLite handle shared by the CLI and the web server.

use crate::error::DbResult;
use crate::migrations;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use tracing::info;

pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Handler threads each take a connection, so the file-backed pool stays small
/// but above one.
const FILE_POOL_SIZE: u32 = 4;

/// Cheap to clone; all clones share one pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open (and create if needed) the database file, then bring its schema
    /// up to date.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening database at: {}", path.display());

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")
        });
        Self::from_manager(manager, FILE_POOL_SIZE)
    }

    /// A private in-memory database. Every pooled connection would see its
    /// own empty database, so the pool holds exactly one.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::from_manager(SqliteConnectionManager::memory(), 1)
    }

    fn from_manager(manager: SqliteConnectionManager, size: u32) -> DbResult<Self> {
        let pool = Pool::builder().max_size(size).build(manager)?;
        migrations::initialize_schema(&*pool.get()?)?;
        Ok(Self { pool })
    }

    pub fn conn(&self) -> DbResult<PooledConn> {
        Ok(self.pool.get()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.count_users().unwrap(), 0);
    }

    #[test]
    fn test_open_file_creates_parent_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chatjee.db");

        {
            let db = Database::open(&path).unwrap();
            db.register_user(&jee_core::UserInfo::new("a@b.c", "Asha"))
                .unwrap();
        }
        assert!(path.exists());

        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.count_users().unwrap(), 1);
    }
}
