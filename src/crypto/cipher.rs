//! AES-256-GCM authenticated encryption with a detached tag.
//!
//! The caller supplies the key, the 12-byte IV, and the associated data.
//! `seal` returns the ciphertext and the 16-byte tag separately so the
//! envelope can lay them out explicitly.  `open` verifies the tag before
//! any plaintext is released.

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

use super::kdf::DerivedKey;

/// Size of the AES-256-GCM IV (nonce) in bytes.
pub const IV_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key` and `iv`, authenticating `aad` as well.
///
/// Returns `(ciphertext, tag)`.  The ciphertext has the same length as
/// the plaintext.
pub fn seal(
    plaintext: &[u8],
    key: &DerivedKey,
    iv: &[u8; IV_LEN],
    aad: &[u8],
) -> Result<(Vec<u8>, [u8; TAG_LEN])> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    // Encrypt in place so the plaintext is only ever copied once.
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(iv), aad, &mut buffer)
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(tag.as_slice());
    Ok((buffer, tag_bytes))
}

/// Decrypt data produced by `seal`.
///
/// Any failure (wrong key, altered ciphertext, tag, IV or `aad`) is
/// reported as `AuthenticationFailure` and no plaintext is returned.
pub fn open(
    ciphertext: &[u8],
    key: &DerivedKey,
    iv: &[u8; IV_LEN],
    tag: &[u8; TAG_LEN],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| VaultError::AuthenticationFailure)?;

    // The buffer is wrapped before decryption so a failed tag check
    // still wipes whatever was written into it.
    let mut buffer = Zeroizing::new(ciphertext.to_vec());
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(iv),
            aad,
            buffer.as_mut_slice(),
            Tag::from_slice(tag),
        )
        .map_err(|_| VaultError::AuthenticationFailure)?;

    Ok(buffer)
}

/// Generate a random 12-byte IV.
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    rand::rngs::OsRng.fill_bytes(&mut iv);
    iv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> DerivedKey {
        DerivedKey::new([byte; 32])
    }

    #[test]
    fn seal_open_roundtrip() {
        let iv = generate_iv();
        let (ct, tag) = seal(b"postgres://db", &key(1), &iv, b"hdr").unwrap();
        assert_eq!(ct.len(), b"postgres://db".len());

        let pt = open(&ct, &key(1), &iv, &tag, b"hdr").unwrap();
        assert_eq!(pt.as_slice(), b"postgres://db");
    }

    #[test]
    fn empty_plaintext_still_has_a_tag() {
        let iv = generate_iv();
        let (ct, tag) = seal(b"", &key(2), &iv, b"").unwrap();
        assert!(ct.is_empty());
        assert_ne!(tag, [0u8; TAG_LEN]);
        assert!(open(&ct, &key(2), &iv, &tag, b"").unwrap().is_empty());
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let iv = generate_iv();
        let (ct, tag) = seal(b"value", &key(3), &iv, b"").unwrap();
        assert!(matches!(
            open(&ct, &key(4), &iv, &tag, b""),
            Err(VaultError::AuthenticationFailure)
        ));
    }

    #[test]
    fn changed_aad_fails_authentication() {
        let iv = generate_iv();
        let (ct, tag) = seal(b"value", &key(5), &iv, b"header-a").unwrap();
        assert!(matches!(
            open(&ct, &key(5), &iv, &tag, b"header-b"),
            Err(VaultError::AuthenticationFailure)
        ));
    }

    #[test]
    fn changed_iv_fails_authentication() {
        let iv = generate_iv();
        let (ct, tag) = seal(b"value", &key(6), &iv, b"").unwrap();
        let mut other = iv;
        other[0] ^= 0x01;
        assert!(open(&ct, &key(6), &other, &tag, b"").is_err());
    }

    #[test]
    fn ivs_are_random() {
        assert_ne!(generate_iv(), generate_iv());
    }
}
