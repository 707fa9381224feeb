//! High-level vault operations used by the CLI and embedders.
//!
//! `VaultService` ties the crypto layer, the envelope codec, and a
//! `RecordStore` together so the rest of the application can work with
//! calls like `vault.store_secret("repo", "DB_URL", "postgres://...", pw)`.
//!
//! The service keeps no state between calls: every password, derived key
//! and plaintext lives only for the duration of one operation.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tracing::{debug, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::{self, KdfParams};
use crate::errors::{Result, VaultError};
use crate::store::RecordStore;

use super::envelope::{Envelope, CURRENT_VERSION};
use super::record::{NewSecretRecord, SecretMetadata};

/// Longest accepted key name, in bytes.
const MAX_KEY_NAME_LEN: usize = 256;

/// The vault facade.  Construct it with a store handle and the KDF cost
/// to use for new envelopes.
pub struct VaultService<S> {
    /// Where envelopes are persisted.
    store: S,

    /// Argon2id cost for envelopes sealed by this service.  Existing
    /// envelopes are always opened with the params they carry.
    kdf_params: KdfParams,
}

impl<S: RecordStore> VaultService<S> {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Build a service over `store`, rejecting unusable KDF params early.
    pub fn new(store: S, kdf_params: KdfParams) -> Result<Self> {
        kdf_params.validate()?;
        Ok(Self { store, kdf_params })
    }

    /// The underlying record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// KDF params used for new envelopes.
    pub fn kdf_params(&self) -> &KdfParams {
        &self.kdf_params
    }

    // ------------------------------------------------------------------
    // Sealing
    // ------------------------------------------------------------------

    /// Seal a value under `password` without storing it.
    ///
    /// Every call draws a fresh salt and IV, so sealing the same value
    /// twice never yields the same envelope.
    pub fn seal_value(&self, plaintext_value: &str, password: &str) -> Result<String> {
        crypto::validate_password(password)?;

        let salt = crypto::generate_salt();
        let key = crypto::derive_key(password.as_bytes(), &salt, &self.kdf_params)?;
        let iv = crypto::generate_iv();
        let header = Envelope::header_for(&self.kdf_params, &salt);

        let (ciphertext, tag) = crypto::seal(plaintext_value.as_bytes(), &key, &iv, &header)?;

        let envelope = Envelope {
            version: CURRENT_VERSION,
            kdf_params: self.kdf_params,
            salt,
            iv,
            tag,
            ciphertext,
        };
        Ok(envelope.encode())
    }

    /// Open an envelope string with `password`.
    ///
    /// The key is derived from the envelope's own salt and params.
    /// Either the whole plaintext comes back or an error does.
    pub fn open_value(&self, envelope: &str, password: &str) -> Result<Zeroizing<String>> {
        crypto::validate_password(password)?;

        let envelope = Envelope::decode(envelope)?;
        let key = crypto::derive_key(password.as_bytes(), &envelope.salt, &envelope.kdf_params)?;

        let mut plaintext = crypto::open(
            &envelope.ciphertext,
            &key,
            &envelope.iv,
            &envelope.tag,
            &envelope.header_bytes(),
        )?;

        // Take the bytes out of the zeroizing buffer; from_utf8 reuses the
        // allocation, and the failure path wipes it before discarding.
        let bytes = std::mem::take(&mut *plaintext);
        let value = String::from_utf8(bytes).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            VaultError::MalformedEnvelope("secret value is not valid UTF-8".into())
        })?;
        Ok(Zeroizing::new(value))
    }

    // ------------------------------------------------------------------
    // Secret operations
    // ------------------------------------------------------------------

    /// Encrypt a value and store it for `(repository_id, key_name)`.
    ///
    /// Replaces any earlier value for the same pair (last write wins) and
    /// returns the record id.
    pub fn store_secret(
        &self,
        repository_id: &str,
        key_name: &str,
        plaintext_value: &str,
        password: &str,
    ) -> Result<String> {
        validate_repository_id(repository_id)?;
        validate_key_name(key_name)?;

        let envelope = self.seal_value(plaintext_value, password)?;

        let record = self.store.upsert(NewSecretRecord {
            repository_id: repository_id.to_string(),
            key_name: key_name.to_string(),
            envelope,
        })?;

        debug!(
            repository_id,
            key_name,
            record_id = %record.id,
            "stored secret"
        );
        Ok(record.id)
    }

    /// Load a record and decrypt its value.
    ///
    /// A wrong password and a tampered record both yield
    /// `AuthenticationFailure`.  The plaintext is never logged.
    pub fn reveal_secret(&self, record_id: &str, password: &str) -> Result<Zeroizing<String>> {
        crypto::validate_password(password)?;

        let record = self
            .store
            .get(record_id)?
            .ok_or_else(|| VaultError::NotFound(record_id.to_string()))?;

        let result = self.open_value(&record.envelope, password);
        match &result {
            Ok(_) => debug!(record_id, "revealed secret"),
            Err(VaultError::AuthenticationFailure) => {
                warn!(record_id, "secret could not be authenticated")
            }
            Err(_) => {}
        }
        result
    }

    /// Look up the record for `(repository_id, key_name)` and decrypt it.
    pub fn reveal_by_key(
        &self,
        repository_id: &str,
        key_name: &str,
        password: &str,
    ) -> Result<Zeroizing<String>> {
        crypto::validate_password(password)?;
        validate_key_name(key_name)?;

        let record = self
            .store
            .find(repository_id, key_name)?
            .ok_or_else(|| VaultError::NotFound(format!("'{key_name}' in {repository_id}")))?;

        self.reveal_secret(&record.id, password)
    }

    /// Store many variables for one repository under the same password.
    ///
    /// Entries with an empty key or value are skipped.  A key listed more
    /// than once is stored once, with its last value.  Key derivation is
    /// the expensive step and each entry has its own salt, so entries are
    /// sealed on scoped worker threads, at most one per available core.
    /// Returns one record id per distinct key, in first-seen order.
    pub fn store_many(
        &self,
        repository_id: &str,
        entries: &[(String, String)],
        password: &str,
    ) -> Result<Vec<String>> {
        validate_repository_id(repository_id)?;
        crypto::validate_password(password)?;

        // A repeated key keeps its first position and its last value.
        let mut complete: Vec<(&str, &str)> = Vec::with_capacity(entries.len());
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (key, value) in entries {
            if key.is_empty() || value.is_empty() {
                continue;
            }
            let (key, value) = (key.as_str(), value.as_str());
            match positions.get(key) {
                Some(&index) => complete[index].1 = value,
                None => {
                    positions.insert(key, complete.len());
                    complete.push((key, value));
                }
            }
        }

        // Validate every name first so a bad row fails before any work.
        for (key, _) in &complete {
            validate_key_name(key)?;
        }

        if complete.is_empty() {
            return Ok(Vec::new());
        }

        let workers = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
            .min(complete.len());

        let next = AtomicUsize::new(0);
        let results: Mutex<Vec<Option<Result<String>>>> =
            Mutex::new((0..complete.len()).map(|_| None).collect());

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some((key, value)) = complete.get(index) else {
                        break;
                    };
                    let outcome = self.store_secret(repository_id, key, value, password);
                    if let Ok(mut slots) = results.lock() {
                        slots[index] = Some(outcome);
                    }
                });
            }
        });

        let slots = results
            .into_inner()
            .map_err(|_| VaultError::Persistence("bulk store worker panicked".into()))?;

        let mut ids = Vec::with_capacity(slots.len());
        for slot in slots {
            match slot {
                Some(outcome) => ids.push(outcome?),
                None => {
                    return Err(VaultError::Persistence(
                        "bulk store worker did not finish".into(),
                    ))
                }
            }
        }

        debug!(repository_id, count = ids.len(), "stored secrets in bulk");
        Ok(ids)
    }

    /// List metadata for all secrets of a repository, sorted by key name.
    pub fn list_secrets(&self, repository_id: &str) -> Result<Vec<SecretMetadata>> {
        let mut list: Vec<SecretMetadata> = self
            .store
            .list(repository_id)?
            .iter()
            .map(SecretMetadata::from)
            .collect();

        list.sort_by(|a, b| a.key_name.cmp(&b.key_name));
        Ok(list)
    }

    /// Destroy every secret of a repository.  Returns how many were removed.
    pub fn delete_repository(&self, repository_id: &str) -> Result<usize> {
        validate_repository_id(repository_id)?;
        let removed = self.store.delete_repository(repository_id)?;
        debug!(repository_id, removed, "deleted repository secrets");
        Ok(removed)
    }
}

// ----------------------------------------------------------------------
// Validation
// ----------------------------------------------------------------------

fn validate_repository_id(repository_id: &str) -> Result<()> {
    if repository_id.trim().is_empty() {
        return Err(VaultError::Configuration(
            "repository id cannot be empty".into(),
        ));
    }
    Ok(())
}

/// Validate that a key name is safe.
///
/// Allowed: ASCII letters, digits, underscores, hyphens, periods.
/// Must be non-empty and at most 256 characters.
pub fn validate_key_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(VaultError::Configuration("key name cannot be empty".into()));
    }
    if name.len() > MAX_KEY_NAME_LEN {
        return Err(VaultError::Configuration(format!(
            "key name cannot exceed {MAX_KEY_NAME_LEN} characters"
        )));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
    {
        return Err(VaultError::Configuration(format!(
            "key name '{name}' contains invalid characters; only ASCII letters, digits, underscores, hyphens, and periods are allowed"
        )));
    }
    Ok(())
}
