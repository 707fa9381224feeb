//! In-memory record store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use super::RecordStore;
use crate::errors::{Result, VaultError};
use crate::vault::record::{NewSecretRecord, SecretRecord};

/// Records held in a `HashMap` keyed by record id.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, SecretRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all repositories.
    pub fn len(&self) -> usize {
        self.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the stored envelope of a record in place.
    ///
    /// Bypasses the vault entirely; used to simulate storage corruption.
    pub fn overwrite_envelope(&self, record_id: &str, envelope: &str) -> Result<()> {
        let mut records = self.lock()?;
        let record = records
            .get_mut(record_id)
            .ok_or_else(|| VaultError::NotFound(record_id.to_string()))?;
        record.envelope = envelope.to_string();
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, SecretRecord>>> {
        self.records
            .lock()
            .map_err(|_| VaultError::Persistence("record store lock poisoned".into()))
    }
}

impl RecordStore for MemoryRecordStore {
    fn upsert(&self, record: NewSecretRecord) -> Result<SecretRecord> {
        let mut records = self.lock()?;
        let now = Utc::now();

        let existing = records
            .values_mut()
            .find(|r| r.repository_id == record.repository_id && r.key_name == record.key_name);

        if let Some(existing) = existing {
            existing.envelope = record.envelope;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let stored = SecretRecord {
            id: Uuid::new_v4().to_string(),
            repository_id: record.repository_id,
            key_name: record.key_name,
            envelope: record.envelope,
            created_at: now,
            updated_at: now,
        };
        records.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    fn get(&self, record_id: &str) -> Result<Option<SecretRecord>> {
        Ok(self.lock()?.get(record_id).cloned())
    }

    fn find(&self, repository_id: &str, key_name: &str) -> Result<Option<SecretRecord>> {
        Ok(self
            .lock()?
            .values()
            .find(|r| r.repository_id == repository_id && r.key_name == key_name)
            .cloned())
    }

    fn list(&self, repository_id: &str) -> Result<Vec<SecretRecord>> {
        let mut list: Vec<SecretRecord> = self
            .lock()?
            .values()
            .filter(|r| r.repository_id == repository_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.key_name.cmp(&b.key_name));
        Ok(list)
    }

    fn delete_repository(&self, repository_id: &str) -> Result<usize> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|_, r| r.repository_id != repository_id);
        Ok(before - records.len())
    }
}
