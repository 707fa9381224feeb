//! Persistence collaborators for secret records.
//!
//! The vault only needs a handful of record operations, captured by the
//! `RecordStore` trait.  Two implementations ship with the crate:
//! - `MemoryRecordStore`: a mutex-guarded map, for tests and embedding
//! - `SqliteRecordStore`: a durable `environment_variables` table

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use crate::errors::Result;
use crate::vault::record::{NewSecretRecord, SecretRecord};

pub use memory::MemoryRecordStore;
pub use sqlite::SqliteRecordStore;

/// A record store keyed by record id, unique on `(repository_id, key_name)`.
///
/// Implementations own their consistency: `upsert` must be atomic with
/// respect to the uniqueness of `(repository_id, key_name)`.
pub trait RecordStore: Send + Sync {
    /// Insert a record, or replace the envelope of the existing record for
    /// the same `(repository_id, key_name)`.  The existing record keeps its
    /// id and `created_at`.
    fn upsert(&self, record: NewSecretRecord) -> Result<SecretRecord>;

    /// Load a record by id.
    fn get(&self, record_id: &str) -> Result<Option<SecretRecord>>;

    /// Load the record for a repository and key name.
    fn find(&self, repository_id: &str, key_name: &str) -> Result<Option<SecretRecord>>;

    /// All records of a repository, sorted by key name.
    fn list(&self, repository_id: &str) -> Result<Vec<SecretRecord>>;

    /// Remove every record of a repository, returning how many were removed.
    fn delete_repository(&self, repository_id: &str) -> Result<usize>;
}

impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    fn upsert(&self, record: NewSecretRecord) -> Result<SecretRecord> {
        (**self).upsert(record)
    }

    fn get(&self, record_id: &str) -> Result<Option<SecretRecord>> {
        (**self).get(record_id)
    }

    fn find(&self, repository_id: &str, key_name: &str) -> Result<Option<SecretRecord>> {
        (**self).find(repository_id, key_name)
    }

    fn list(&self, repository_id: &str) -> Result<Vec<SecretRecord>> {
        (**self).list(repository_id)
    }

    fn delete_repository(&self, repository_id: &str) -> Result<usize> {
        (**self).delete_repository(repository_id)
    }
}
