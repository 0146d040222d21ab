//! Database CRUD operations.

pub mod ingests;
pub mod users;
