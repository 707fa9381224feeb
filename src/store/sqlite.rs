//! SQLite-backed record store.
//!
//! Secrets live in a single `environment_variables` table.  The
//! `UNIQUE (repository_id, key)` constraint plus `ON CONFLICT DO UPDATE`
//! gives last-write-wins without a read-modify-write race.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use super::RecordStore;
use crate::errors::{Result, VaultError};
use crate::vault::record::{NewSecretRecord, SecretRecord};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS environment_variables (
    id              TEXT PRIMARY KEY,
    repository_id   TEXT NOT NULL,
    key             TEXT NOT NULL,
    encrypted_value TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    UNIQUE (repository_id, key)
);";

const SELECT_COLUMNS: &str = "SELECT id, repository_id, key, encrypted_value, created_at, updated_at
     FROM environment_variables";

/// Durable record store on a SQLite database file.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Open (or create) the database at `path`.
    ///
    /// The file gets owner-only permissions on Unix.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self::with_connection(Connection::open(path)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        debug!(path = %path.display(), "opened secret database");
        Ok(store)
    }

    /// A throwaway in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| VaultError::Persistence("database lock poisoned".into()))
    }
}

/// Column values exactly as stored; timestamps are still text.
struct RawRow {
    id: String,
    repository_id: String,
    key: String,
    encrypted_value: String,
    created_at: String,
    updated_at: String,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            repository_id: row.get(1)?,
            key: row.get(2)?,
            encrypted_value: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn into_record(self) -> Result<SecretRecord> {
        Ok(SecretRecord {
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
            repository_id: self.repository_id,
            key_name: self.key,
            envelope: self.encrypted_value,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| VaultError::Persistence(format!("bad timestamp '{value}': {e}")))
}

fn find_locked(
    conn: &Connection,
    repository_id: &str,
    key_name: &str,
) -> Result<Option<SecretRecord>> {
    let sql = format!("{SELECT_COLUMNS} WHERE repository_id = ?1 AND key = ?2");
    conn.query_row(&sql, params![repository_id, key_name], RawRow::from_row)
        .optional()?
        .map(RawRow::into_record)
        .transpose()
}

impl RecordStore for SqliteRecordStore {
    fn upsert(&self, record: NewSecretRecord) -> Result<SecretRecord> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO environment_variables
                 (id, repository_id, key, encrypted_value, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT (repository_id, key) DO UPDATE SET
                 encrypted_value = excluded.encrypted_value,
                 updated_at = excluded.updated_at",
            params![
                Uuid::new_v4().to_string(),
                record.repository_id,
                record.key_name,
                record.envelope,
                now
            ],
        )?;

        find_locked(&conn, &record.repository_id, &record.key_name)?.ok_or_else(|| {
            VaultError::Persistence("record vanished right after it was written".into())
        })
    }

    fn get(&self, record_id: &str) -> Result<Option<SecretRecord>> {
        let conn = self.lock()?;
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        conn.query_row(&sql, params![record_id], RawRow::from_row)
            .optional()?
            .map(RawRow::into_record)
            .transpose()
    }

    fn find(&self, repository_id: &str, key_name: &str) -> Result<Option<SecretRecord>> {
        let conn = self.lock()?;
        find_locked(&conn, repository_id, key_name)
    }

    fn list(&self, repository_id: &str) -> Result<Vec<SecretRecord>> {
        let conn = self.lock()?;
        let sql = format!("{SELECT_COLUMNS} WHERE repository_id = ?1 ORDER BY key");
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt.query_map(params![repository_id], RawRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    fn delete_repository(&self, repository_id: &str) -> Result<usize> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM environment_variables WHERE repository_id = ?1",
            params![repository_id],
        )?;
        Ok(removed)
    }
}
