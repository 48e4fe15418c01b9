//! `SQLite` session file.
//!
//! Keeps the gateway session token between runs so the account is not
//! re-authorized every time.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{AppError, Result};

/// Persistent store of session tokens, keyed by api id.
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    /// Opens or creates the session database.
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or the schema created.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create session directory", e))?;
        }

        let conn = Connection::open(path).map_err(AppError::session)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                api_id INTEGER PRIMARY KEY,
                token TEXT NOT NULL,
                account_id INTEGER NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .map_err(AppError::session)?;

        tracing::debug!("Opened session store: {}", path.display());

        Ok(Self { conn })
    }

    /// Returns the stored token for `api_id`, if any.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub fn load(&self, api_id: i32) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT token FROM sessions WHERE api_id = ?1",
                params![api_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(AppError::session)
    }

    /// Stores (or replaces) the token for `api_id`.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn save(&self, api_id: i32, token: &str, account_id: i64) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO sessions (api_id, token, account_id, updated_at)
                 VALUES (?1, ?2, ?3, datetime('now'))
                 ON CONFLICT(api_id) DO UPDATE SET
                    token = excluded.token,
                    account_id = excluded.account_id,
                    updated_at = excluded.updated_at",
                params![api_id, token, account_id],
            )
            .map_err(AppError::session)?;
        Ok(())
    }
}
