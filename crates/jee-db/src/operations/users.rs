//! Registered user operations.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use chrono::{DateTime, Utc};
use jee_core::UserInfo;
use rusqlite::params;

/// A user row from the registry.
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

impl RegisteredUser {
    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: None,
            email: self.email.clone(),
            name: self.name.clone(),
            picture: self.picture.clone(),
        }
    }
}

impl Database {
    /// Record a sign-in.
    ///
    /// A user is inserted the first time their email is seen; afterwards only
    /// `last_login_at` changes. Returns `true` when the user was new.
    pub fn register_user(&self, user: &UserInfo) -> DbResult<bool> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        let inserted = conn.execute(
            r#"
            INSERT OR IGNORE INTO users (email, name, picture, created_at, last_login_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
            params![user.email, user.name, user.picture, now],
        )?;

        if inserted == 0 {
            conn.execute(
                "UPDATE users SET last_login_at = ?2 WHERE email = ?1",
                params![user.email, now],
            )?;
        }

        Ok(inserted > 0)
    }

    /// Get a user by email.
    pub fn get_user(&self, email: &str) -> DbResult<RegisteredUser> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT email, name, picture, created_at, last_login_at FROM users WHERE email = ?1",
            params![email],
            row_to_user,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                DbError::NotFound(format!("User not found: {}", email))
            }
            _ => DbError::from(e),
        })
    }

    /// List all users, most recently active first.
    pub fn list_users(&self) -> DbResult<Vec<RegisteredUser>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT email, name, picture, created_at, last_login_at
             FROM users ORDER BY last_login_at DESC",
        )?;
        let rows = stmt.query_map([], row_to_user)?;
        let users = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    pub fn count_users(&self) -> DbResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<RegisteredUser> {
    Ok(RegisteredUser {
        email: row.get(0)?,
        name: row.get(1)?,
        picture: row.get(2)?,
        created_at: timestamp_column(row, 3)?,
        last_login_at: timestamp_column(row, 4)?,
    })
}

/// Read an RFC 3339 text column as a UTC timestamp.
pub(crate) fn timestamp_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let value: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asha() -> UserInfo {
        UserInfo::new("asha@example.com", "Asha").with_picture("https://img/asha.png")
    }

    #[test]
    fn test_register_new_user() {
        let db = Database::open_in_memory().unwrap();

        assert!(db.register_user(&asha()).unwrap());

        let user = db.get_user("asha@example.com").unwrap();
        assert_eq!(user.name, "Asha");
        assert_eq!(user.picture.as_deref(), Some("https://img/asha.png"));
        assert_eq!(db.count_users().unwrap(), 1);
    }

    #[test]
    fn test_register_existing_email_does_not_duplicate() {
        let db = Database::open_in_memory().unwrap();
        db.register_user(&asha()).unwrap();

        let renamed = UserInfo::new("asha@example.com", "Someone Else");
        assert!(!db.register_user(&renamed).unwrap());

        assert_eq!(db.count_users().unwrap(), 1);
        // The first registration wins.
        assert_eq!(db.get_user("asha@example.com").unwrap().name, "Asha");
    }

    #[test]
    fn test_get_missing_user() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.get_user("nobody@example.com"),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_users() {
        let db = Database::open_in_memory().unwrap();
        db.register_user(&asha()).unwrap();
        db.register_user(&UserInfo::new("ravi@example.com", "Ravi"))
            .unwrap();

        let users = db.list_users().unwrap();
        assert_eq!(users.len(), 2);
        let info = users[0].to_user_info();
        assert!(!info.email.is_empty());
    }
}
