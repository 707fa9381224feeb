//! Tamper and truncation tests for sealed envelopes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use repovault::crypto::{KdfParams, IV_LEN, SALT_LEN, TAG_LEN};
use repovault::errors::VaultError;
use repovault::store::MemoryRecordStore;
use repovault::vault::envelope::{CURRENT_VERSION, MIN_V1_LEN};
use repovault::vault::{Envelope, VaultService};

const PASSWORD: &str = "s3cr3t!";

/// Offset of the salt inside a v1 envelope.
const SALT_START: usize = 13;
const IV_START: usize = SALT_START + SALT_LEN;
const TAG_START: usize = IV_START + IV_LEN;
const CT_START: usize = TAG_START + TAG_LEN;

fn vault() -> VaultService<MemoryRecordStore> {
    let params = KdfParams {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    };
    VaultService::new(MemoryRecordStore::new(), params).expect("valid params")
}

fn sealed_raw(vault: &VaultService<MemoryRecordStore>, value: &str) -> Vec<u8> {
    let envelope = vault.seal_value(value, PASSWORD).expect("seal");
    BASE64.decode(envelope).expect("envelope is base64")
}

fn open_raw(vault: &VaultService<MemoryRecordStore>, raw: &[u8]) -> Result<String, VaultError> {
    vault
        .open_value(&BASE64.encode(raw), PASSWORD)
        .map(|v| v.to_string())
}

#[test]
fn sealed_envelope_has_v1_layout() {
    let vault = vault();
    let raw = sealed_raw(&vault, "value");

    assert_eq!(raw[0], CURRENT_VERSION);
    assert_eq!(&raw[1..5], &8_192u32.to_le_bytes());
    assert_eq!(&raw[5..9], &1u32.to_le_bytes());
    assert_eq!(&raw[9..13], &1u32.to_le_bytes());
    assert_eq!(raw.len(), MIN_V1_LEN + "value".len());
}

#[test]
fn decoded_envelope_exposes_its_parts() {
    let vault = vault();
    let envelope = vault.seal_value("abc", PASSWORD).unwrap();

    let parsed = Envelope::decode(&envelope).unwrap();
    assert_eq!(parsed.version, CURRENT_VERSION);
    assert_eq!(parsed.kdf_params, *vault.kdf_params());
    assert_eq!(parsed.ciphertext.len(), 3);
}

#[test]
fn flipping_any_ciphertext_bit_is_detected() {
    let vault = vault();
    let raw = sealed_raw(&vault, "secret");

    for byte in CT_START..raw.len() {
        for bit in 0..8u8 {
            let mut tampered = raw.clone();
            tampered[byte] ^= 1 << bit;
            assert!(
                matches!(
                    open_raw(&vault, &tampered),
                    Err(VaultError::AuthenticationFailure)
                ),
                "ciphertext byte {byte} bit {bit} went unnoticed"
            );
        }
    }
}

#[test]
fn flipping_any_tag_bit_is_detected() {
    let vault = vault();
    let raw = sealed_raw(&vault, "secret");

    for byte in TAG_START..CT_START {
        for bit in 0..8u8 {
            let mut tampered = raw.clone();
            tampered[byte] ^= 1 << bit;
            assert!(
                matches!(
                    open_raw(&vault, &tampered),
                    Err(VaultError::AuthenticationFailure)
                ),
                "tag byte {byte} bit {bit} went unnoticed"
            );
        }
    }
}

#[test]
fn flipping_iv_or_salt_is_detected() {
    let vault = vault();
    let raw = sealed_raw(&vault, "secret");

    for byte in [SALT_START, SALT_START + SALT_LEN - 1, IV_START, TAG_START - 1] {
        let mut tampered = raw.clone();
        tampered[byte] ^= 0x80;
        assert!(
            matches!(
                open_raw(&vault, &tampered),
                Err(VaultError::AuthenticationFailure)
            ),
            "byte {byte} went unnoticed"
        );
    }
}

#[test]
fn altered_kdf_params_are_detected() {
    let vault = vault();
    let mut raw = sealed_raw(&vault, "secret");

    // iterations 1 -> 2: still in range, but no longer the sealed header.
    raw[5..9].copy_from_slice(&2u32.to_le_bytes());
    assert!(matches!(
        open_raw(&vault, &raw),
        Err(VaultError::AuthenticationFailure)
    ));
}

#[test]
fn out_of_range_params_are_malformed() {
    let vault = vault();
    let mut raw = sealed_raw(&vault, "secret");

    raw[9..13].copy_from_slice(&0u32.to_le_bytes());
    assert!(matches!(
        open_raw(&vault, &raw),
        Err(VaultError::MalformedEnvelope(_))
    ));
}

#[test]
fn unknown_version_is_malformed() {
    let vault = vault();
    let mut raw = sealed_raw(&vault, "secret");
    raw[0] = 2;

    assert!(matches!(
        open_raw(&vault, &raw),
        Err(VaultError::MalformedEnvelope(_))
    ));
}

#[test]
fn truncation_is_rejected_without_panicking() {
    let vault = vault();
    let raw = sealed_raw(&vault, "secret");

    for len in 0..MIN_V1_LEN {
        assert!(
            matches!(
                open_raw(&vault, &raw[..len]),
                Err(VaultError::MalformedEnvelope(_))
            ),
            "length {len} should be malformed"
        );
    }

    // Dropping ciphertext bytes keeps the layout valid but breaks the tag.
    assert!(matches!(
        open_raw(&vault, &raw[..raw.len() - 1]),
        Err(VaultError::AuthenticationFailure)
    ));
}

#[test]
fn garbage_input_is_malformed() {
    let vault = vault();
    for input in ["", "%%%", "not-an-envelope"] {
        assert!(matches!(
            vault.open_value(input, PASSWORD),
            Err(VaultError::MalformedEnvelope(_))
        ));
    }
}
