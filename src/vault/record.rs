//! Secret records as the persistence layer sees them.
//!
//! A record ties an opaque envelope string to its owning repository and
//! key name.  The store never looks inside `envelope`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored secret: identity plus its sealed envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    /// Record id (UUID v4), stable across overwrites.
    pub id: String,

    /// The repository this secret belongs to.
    pub repository_id: String,

    /// The variable name (e.g. "DATABASE_URL"), unique per repository.
    pub key_name: String,

    /// Base64 envelope produced by `Envelope::encode`.
    pub envelope: String,

    /// When this secret was first stored.
    pub created_at: DateTime<Utc>,

    /// When this secret was last replaced.
    pub updated_at: DateTime<Utc>,
}

/// What the vault hands to `RecordStore::upsert`.
#[derive(Debug, Clone)]
pub struct NewSecretRecord {
    pub repository_id: String,
    pub key_name: String,
    pub envelope: String,
}

/// Lightweight metadata about a secret (no envelope).
///
/// Returned by `VaultService::list_secrets` so callers can display
/// key names and timestamps without touching any ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretMetadata {
    pub id: String,
    pub repository_id: String,
    pub key_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SecretRecord> for SecretMetadata {
    fn from(record: &SecretRecord) -> Self {
        Self {
            id: record.id.clone(),
            repository_id: record.repository_id.clone(),
            key_name: record.key_name.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
