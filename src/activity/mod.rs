//! Activity log: SQLite-based operation history.
//!
//! Stores a record of every vault operation (store, import, reveal,
//! delete-repo) in a local SQLite database at `<data_dir>/activity.db`.
//! Entries name the user, repository and key involved; they never hold
//! values, passwords, or envelopes.
//!
//! Designed for graceful degradation: if the database can't be opened or
//! written to, operations silently continue without logging.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::debug;

use crate::errors::{Result, VaultError};

/// A single activity log entry.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub action: String,
    pub repository_id: Option<String>,
    pub key_name: Option<String>,
    pub details: Option<String>,
}

/// SQLite-backed activity log.
pub struct ActivityLog {
    conn: Connection,
}

impl ActivityLog {
    /// File name of the activity database inside the data directory.
    const FILE_NAME: &'static str = "activity.db";

    /// Open (or create) the activity database at `<data_dir>/activity.db`.
    ///
    /// Returns `None` if the database can't be opened; callers should
    /// treat this as "activity logging unavailable" and continue normally.
    pub fn open(data_dir: &Path) -> Option<Self> {
        let db_path = Self::db_path(data_dir);
        let conn = Connection::open(&db_path).ok()?;

        // Set restrictive permissions on the activity database (owner-only).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&db_path, perms);
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS activities (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp     TEXT NOT NULL,
                user_id       TEXT NOT NULL,
                action        TEXT NOT NULL,
                repository_id TEXT,
                key_name      TEXT,
                details       TEXT
            );",
        )
        .ok()?;

        Some(Self { conn })
    }

    /// Record an operation. Fire-and-forget: errors are only traced.
    pub fn log(
        &self,
        user_id: &str,
        action: &str,
        repository_id: Option<&str>,
        key_name: Option<&str>,
        details: Option<&str>,
    ) {
        let now = Utc::now().to_rfc3339();
        if let Err(e) = self.conn.execute(
            "INSERT INTO activities (timestamp, user_id, action, repository_id, key_name, details)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![now, user_id, action, repository_id, key_name, details],
        ) {
            debug!(action, error = %e, "activity not recorded");
        }
    }

    /// Query recent activity entries.
    ///
    /// - `limit`: maximum number of entries to return (most recent first).
    /// - `since`: if provided, only return entries newer than this timestamp.
    pub fn query(&self, limit: usize, since: Option<DateTime<Utc>>) -> Result<Vec<ActivityEntry>> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let (sql, params): (&str, Vec<Box<dyn rusqlite::types::ToSql>>) = match since {
            Some(ref ts) => (
                "SELECT id, timestamp, user_id, action, repository_id, key_name, details
                 FROM activities
                 WHERE timestamp >= ?1
                 ORDER BY id DESC
                 LIMIT ?2",
                vec![
                    Box::new(ts.to_rfc3339()) as Box<dyn rusqlite::types::ToSql>,
                    Box::new(limit_i64),
                ],
            ),
            None => (
                "SELECT id, timestamp, user_id, action, repository_id, key_name, details
                 FROM activities
                 ORDER BY id DESC
                 LIMIT ?1",
                vec![Box::new(limit_i64) as Box<dyn rusqlite::types::ToSql>],
            ),
        };

        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| VaultError::Persistence(format!("activity query prepare: {e}")))?;

        let params_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| &**p).collect();

        let rows = stmt
            .query_map(params_refs.as_slice(), |row| {
                let ts_str: String = row.get(1)?;
                let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                    .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

                Ok(ActivityEntry {
                    id: row.get(0)?,
                    timestamp,
                    user_id: row.get(2)?,
                    action: row.get(3)?,
                    repository_id: row.get(4)?,
                    key_name: row.get(5)?,
                    details: row.get(6)?,
                })
            })
            .map_err(|e| VaultError::Persistence(format!("activity query: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| VaultError::Persistence(format!("activity row: {e}")))?);
        }

        Ok(entries)
    }

    /// Return the path to the activity database (for testing/display).
    pub fn db_path(data_dir: &Path) -> PathBuf {
        data_dir.join(Self::FILE_NAME)
    }
}
