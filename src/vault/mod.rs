//! Vault module: sealing secrets for repositories.
//!
//! This module provides:
//! - The versioned ciphertext envelope (`envelope`)
//! - `SecretRecord` and `SecretMetadata` types (`record`)
//! - The `VaultService` facade that seals, stores, loads and opens (`service`)

pub mod envelope;
pub mod record;
pub mod service;

// Re-export the most commonly used items.
pub use envelope::Envelope;
pub use record::{NewSecretRecord, SecretMetadata, SecretRecord};
pub use service::VaultService;
