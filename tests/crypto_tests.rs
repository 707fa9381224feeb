//! Integration tests for the repovault crypto module.

use repovault::crypto::{
    derive_key, generate_iv, generate_salt, open, seal, validate_password, DerivedKey, KdfParams,
    KEY_LEN, SALT_LEN,
};
use repovault::errors::VaultError;

/// Cheap Argon2 cost so tests stay fast.
fn fast_params() -> KdfParams {
    KdfParams {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn derivation_is_deterministic() {
    let salt = [7u8; SALT_LEN];
    let k1 = derive_key(b"s3cr3t!", &salt, &fast_params()).expect("derive 1");
    let k2 = derive_key(b"s3cr3t!", &salt, &fast_params()).expect("derive 2");

    assert_eq!(k1.as_bytes(), k2.as_bytes());
    assert_eq!(k1.as_bytes().len(), KEY_LEN);
}

#[test]
fn different_passwords_give_different_keys() {
    let salt = generate_salt();
    let k1 = derive_key(b"s3cr3t!", &salt, &fast_params()).unwrap();
    let k2 = derive_key(b"hunter2x", &salt, &fast_params()).unwrap();

    assert_ne!(k1.as_bytes(), k2.as_bytes());
}

#[test]
fn different_salts_give_different_keys() {
    let k1 = derive_key(b"s3cr3t!", &generate_salt(), &fast_params()).unwrap();
    let k2 = derive_key(b"s3cr3t!", &generate_salt(), &fast_params()).unwrap();

    assert_ne!(k1.as_bytes(), k2.as_bytes());
}

#[test]
fn different_params_give_different_keys() {
    let salt = [9u8; SALT_LEN];
    let cheap = fast_params();
    let costlier = KdfParams {
        iterations: 2,
        ..cheap
    };

    let k1 = derive_key(b"s3cr3t!", &salt, &cheap).unwrap();
    let k2 = derive_key(b"s3cr3t!", &salt, &costlier).unwrap();
    assert_ne!(k1.as_bytes(), k2.as_bytes());
}

#[test]
fn short_salt_is_a_configuration_error() {
    let result = derive_key(b"s3cr3t!", &[0u8; 8], &fast_params());
    assert!(matches!(result, Err(VaultError::Configuration(_))));
}

#[test]
fn zero_iterations_is_a_configuration_error() {
    let params = KdfParams {
        iterations: 0,
        ..fast_params()
    };
    let result = derive_key(b"s3cr3t!", &generate_salt(), &params);
    assert!(matches!(result, Err(VaultError::Configuration(_))));
}

#[test]
fn generated_salts_are_unique() {
    assert_ne!(generate_salt(), generate_salt());
}

// ---------------------------------------------------------------------------
// Authenticated encryption
// ---------------------------------------------------------------------------

#[test]
fn seal_open_roundtrip() {
    let key = DerivedKey::new([0xABu8; KEY_LEN]);
    let iv = generate_iv();
    let plaintext = b"postgres://user:pass@db/prod";

    let (ciphertext, tag) = seal(plaintext, &key, &iv, b"header").expect("seal should succeed");
    assert_eq!(ciphertext.len(), plaintext.len());

    let recovered = open(&ciphertext, &key, &iv, &tag, b"header").expect("open should succeed");
    assert_eq!(recovered.as_slice(), plaintext);
}

#[test]
fn open_with_wrong_key_fails() {
    let key = DerivedKey::new([0x11u8; KEY_LEN]);
    let wrong_key = DerivedKey::new([0x22u8; KEY_LEN]);
    let iv = generate_iv();

    let (ciphertext, tag) = seal(b"TOP_SECRET=42", &key, &iv, b"").unwrap();
    let result = open(&ciphertext, &wrong_key, &iv, &tag, b"");

    assert!(matches!(result, Err(VaultError::AuthenticationFailure)));
}

#[test]
fn open_with_different_aad_fails() {
    let key = DerivedKey::new([0x33u8; KEY_LEN]);
    let iv = generate_iv();

    let (ciphertext, tag) = seal(b"value", &key, &iv, b"header-a").unwrap();
    let result = open(&ciphertext, &key, &iv, &tag, b"header-b");

    assert!(matches!(result, Err(VaultError::AuthenticationFailure)));
}

#[test]
fn open_with_wrong_iv_fails() {
    let key = DerivedKey::new([0x44u8; KEY_LEN]);
    let iv = generate_iv();
    let mut other_iv = iv;
    other_iv[0] ^= 0x01;

    let (ciphertext, tag) = seal(b"value", &key, &iv, b"").unwrap();
    let result = open(&ciphertext, &key, &other_iv, &tag, b"");

    assert!(matches!(result, Err(VaultError::AuthenticationFailure)));
}

#[test]
fn empty_plaintext_roundtrips() {
    let key = DerivedKey::new([0x55u8; KEY_LEN]);
    let iv = generate_iv();

    let (ciphertext, tag) = seal(b"", &key, &iv, b"h").unwrap();
    assert!(ciphertext.is_empty());

    let recovered = open(&ciphertext, &key, &iv, &tag, b"h").unwrap();
    assert!(recovered.is_empty());
}

// ---------------------------------------------------------------------------
// Password policy
// ---------------------------------------------------------------------------

#[test]
fn password_length_boundaries() {
    assert!(validate_password("abcdef").is_ok());
    assert!(validate_password("abcdefghijklmnop").is_ok());

    for bad in ["", "abcde", "abcdefghijklmnopq"] {
        assert!(
            matches!(validate_password(bad), Err(VaultError::Configuration(_))),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn password_length_counts_characters() {
    // Six characters, twelve bytes.
    assert!(validate_password("éééééé").is_ok());
    // Sixteen characters, far more than sixteen bytes.
    assert!(validate_password(&"密".repeat(16)).is_ok());
    assert!(validate_password(&"密".repeat(17)).is_err());
}
