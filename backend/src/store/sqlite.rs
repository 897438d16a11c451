use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use crate::models::{Gift, GiftSelection, SelectionWithDetails, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("user does not exist")]
    UnknownUser,
    #[error("gift does not exist")]
    UnknownGift,
    #[error("user already has a selection")]
    AlreadyClaimed,
}

/// SQLite-backed store for users, gifts and gift selections.
///
/// A single connection guarded by a mutex is enough for this workload.
/// The UNIQUE constraint on `gift_selections.user_id` is what enforces
/// the one-selection-per-user rule; callers never pre-check it.
pub struct GiftStore {
    conn: Mutex<Connection>,
}

impl GiftStore {
    /// Opens (or creates) the database at the given URL.
    ///
    /// Accepts either a bare path or a `sqlite:` prefixed URL.
    pub fn new(database_url: &str) -> Result<Self, StoreError> {
        let path = database_url
            .strip_prefix("sqlite:")
            .unwrap_or(database_url);

        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }

        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| StoreError::Database(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                birthday TEXT,
                is_admin INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS gifts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                image_url TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS gift_selections (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL UNIQUE REFERENCES users(id),
                gift_id TEXT NOT NULL REFERENCES gifts(id),
                created_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_gift_selections_created_at
             ON gift_selections(created_at)",
            [],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (id, email, birthday, is_admin, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id,
                user.email,
                user.birthday.map(|d| d.to_string()),
                user.is_admin as i32,
                user.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    pub fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, email, birthday, is_admin, created_at FROM users WHERE id = ?1",
            params![user_id],
            user_from_row,
        )
        .optional()
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    pub fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, email, birthday, is_admin, created_at
                 FROM users ORDER BY created_at ASC",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let users = stmt
            .query_map([], user_from_row)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(users)
    }

    pub fn create_gift(
        &self,
        name: String,
        description: String,
        image_url: Option<String>,
    ) -> Result<Gift, StoreError> {
        let gift = Gift::new(name, description, image_url);
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO gifts (id, name, description, image_url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                gift.id,
                gift.name,
                gift.description,
                gift.image_url,
                gift.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(gift)
    }

    pub fn list_gifts(&self) -> Result<Vec<Gift>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, description, image_url, created_at
                 FROM gifts ORDER BY created_at ASC",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let gifts = stmt
            .query_map([], gift_from_row)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(gifts)
    }

    /// Records the caller's gift selection.
    ///
    /// The existence checks only make the error precise; the real guard
    /// against a double claim is the UNIQUE constraint on `user_id`,
    /// which turns the losing insert of a race into [`StoreError::AlreadyClaimed`].
    pub fn create_selection(
        &self,
        user_id: &str,
        gift_id: &str,
    ) -> Result<GiftSelection, StoreError> {
        let conn = self.lock()?;

        if !exists(&conn, "SELECT 1 FROM users WHERE id = ?1", user_id)? {
            return Err(StoreError::UnknownUser);
        }
        if !exists(&conn, "SELECT 1 FROM gifts WHERE id = ?1", gift_id)? {
            return Err(StoreError::UnknownGift);
        }

        let selection = GiftSelection::new(user_id.to_string(), gift_id.to_string());
        match conn.execute(
            "INSERT INTO gift_selections (id, user_id, gift_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                selection.id,
                selection.user_id,
                selection.gift_id,
                selection.created_at.to_rfc3339(),
            ],
        ) {
            Ok(_) => Ok(selection),
            Err(e) if is_unique_violation(&e, "gift_selections.user_id") => {
                Err(StoreError::AlreadyClaimed)
            }
            Err(e) => Err(StoreError::Database(e.to_string())),
        }
    }

    pub fn selection_for_user(&self, user_id: &str) -> Result<Option<GiftSelection>, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, user_id, gift_id, created_at FROM gift_selections WHERE user_id = ?1",
            params![user_id],
            selection_from_row,
        )
        .optional()
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Lists every selection joined with the selector's email and the
    /// gift's name, newest first.
    pub fn list_selections(&self) -> Result<Vec<SelectionWithDetails>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT s.id, s.user_id, s.gift_id, s.created_at, u.email, g.name
                 FROM gift_selections s
                 JOIN users u ON u.id = s.user_id
                 JOIN gifts g ON g.id = s.gift_id
                 ORDER BY s.created_at DESC",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let selections = stmt
            .query_map([], |row| {
                Ok(SelectionWithDetails {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    gift_id: row.get(2)?,
                    created_at: parse_timestamp(&row.get::<_, String>(3)?),
                    user_email: row.get(4)?,
                    gift_name: row.get(5)?,
                })
            })
            .map_err(|e| StoreError::Database(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(selections)
    }

    /// Deletes a selection by id. Returns false when no row matched.
    pub fn delete_selection(&self, selection_id: &str) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let affected = conn
            .execute(
                "DELETE FROM gift_selections WHERE id = ?1",
                params![selection_id],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(affected > 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

fn exists(conn: &Connection, sql: &str, id: &str) -> Result<bool, StoreError> {
    conn.query_row(sql, params![id], |_| Ok(()))
        .optional()
        .map(|row| row.is_some())
        .map_err(|e| StoreError::Database(e.to_string()))
}

fn is_unique_violation(err: &rusqlite::Error, column: &str) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg)) => {
            e.code == ErrorCode::ConstraintViolation && msg.contains(column)
        }
        _ => false,
    }
}

fn gift_from_row(row: &Row<'_>) -> rusqlite::Result<Gift> {
    Ok(Gift {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        image_url: row.get(3)?,
        created_at: parse_timestamp(&row.get::<_, String>(4)?),
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        birthday: row
            .get::<_, Option<String>>(2)?
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        is_admin: row.get::<_, i32>(3)? != 0,
        created_at: parse_timestamp(&row.get::<_, String>(4)?),
    })
}

fn selection_from_row(row: &Row<'_>) -> rusqlite::Result<GiftSelection> {
    Ok(GiftSelection {
        id: row.get(0)?,
        user_id: row.get(1)?,
        gift_id: row.get(2)?,
        created_at: parse_timestamp(&row.get::<_, String>(3)?),
    })
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
