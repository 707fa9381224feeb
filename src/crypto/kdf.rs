//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects short, user-chosen
//! passwords against brute-force and GPU-based attacks.  The cost
//! parameters are stored in every envelope, so a key can always be
//! re-derived with exactly the settings used when it was sealed.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::Zeroize;

use crate::errors::{Result, VaultError};

/// Length of the salt generated for each envelope (256 bits).
pub const SALT_LEN: usize = 32;

/// Shortest salt `derive_key` accepts.
pub const MIN_SALT_LEN: usize = 16;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Minimum safe memory cost in KiB (8 MB).
pub const MIN_MEMORY_KIB: u32 = 8_192;

/// Largest memory cost an envelope may ask for (4 GB).
pub const MAX_MEMORY_KIB: u32 = 4_194_304;

/// Largest iteration count an envelope may ask for.
pub const MAX_ITERATIONS: u32 = 64;

/// Largest lane count an envelope may ask for.
pub const MAX_PARALLELISM: u32 = 64;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Check the parameters against the accepted bounds.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_MEMORY_KIB..=MAX_MEMORY_KIB).contains(&self.memory_kib) {
            return Err(VaultError::Configuration(format!(
                "Argon2 memory_kib must be between {MIN_MEMORY_KIB} and {MAX_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if !(1..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(VaultError::Configuration(format!(
                "Argon2 iterations must be between 1 and {MAX_ITERATIONS} (got {})",
                self.iterations
            )));
        }
        if !(1..=MAX_PARALLELISM).contains(&self.parallelism) {
            return Err(VaultError::Configuration(format!(
                "Argon2 parallelism must be between 1 and {MAX_PARALLELISM} (got {})",
                self.parallelism
            )));
        }
        Ok(())
    }
}

/// A 32-byte symmetric key that zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to pass to the cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// Derive a 32-byte key from a password and salt with Argon2id.
///
/// The same password + salt + params always produce the same key.
/// An empty password, a salt shorter than 16 bytes, or out-of-range
/// params are caller mistakes and fail with `Configuration`.
pub fn derive_key(password: &[u8], salt: &[u8], kdf_params: &KdfParams) -> Result<DerivedKey> {
    if password.is_empty() {
        return Err(VaultError::Configuration("password cannot be empty".into()));
    }
    if salt.len() < MIN_SALT_LEN {
        return Err(VaultError::Configuration(format!(
            "salt must be at least {MIN_SALT_LEN} bytes (got {})",
            salt.len()
        )));
    }
    kdf_params.validate()?;

    let params = Params::new(
        kdf_params.memory_kib,
        kdf_params.iterations,
        kdf_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| VaultError::Configuration(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| VaultError::Configuration(format!("Argon2id hashing failed: {e}")))?;

    let derived = DerivedKey::new(key);
    key.zeroize();
    Ok(derived)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}
