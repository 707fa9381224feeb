//! Cryptographic primitives for repovault.
//!
//! This module provides:
//! - Argon2id password-based key derivation (`kdf`)
//! - AES-256-GCM sealing and opening with a detached tag (`cipher`)
//! - The password length policy (`password`)

pub mod cipher;
pub mod kdf;
pub mod password;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal, open, derive_key, ...};
pub use cipher::{generate_iv, open, seal, IV_LEN, TAG_LEN};
pub use kdf::{derive_key, generate_salt, DerivedKey, KdfParams, KEY_LEN, SALT_LEN};
pub use password::{validate_password, MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};
