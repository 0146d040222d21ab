//! Jee DB - SQLite persistence for registered users and ingested documents.

mod database;
mod error;
mod migrations;
mod operations;

pub use database::Database;
pub use error::{DbError, DbResult};
pub use operations::ingests::IngestRecord;
pub use operations::users::RegisteredUser;
