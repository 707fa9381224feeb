//! Versioned ciphertext envelope.
//!
//! An envelope is everything needed to re-open a secret except the
//! password.  It is stored as a single base64 string with this binary
//! layout:
//!
//! ```text
//! [version: 1 byte][memory_kib: u32 LE][iterations: u32 LE][parallelism: u32 LE]
//! [salt: 32 bytes][iv: 12 bytes][tag: 16 bytes][ciphertext: n bytes]
//! ```
//!
//! - **Version**: layout version (currently `1`).  Any change to the KDF
//!   algorithm, the AEAD mode, or this layout gets a new version and a
//!   new decoder arm; old arms are never removed.
//! - **KDF params**: the Argon2id cost used for this envelope.
//! - **Salt / IV**: fresh random values for every envelope.
//! - **Tag**: AES-256-GCM tag over the ciphertext, with the header
//!   (version, params, salt) as associated data.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::crypto::kdf::{KdfParams, SALT_LEN};
use crate::crypto::{IV_LEN, TAG_LEN};
use crate::errors::{Result, VaultError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Current envelope layout version.
pub const CURRENT_VERSION: u8 = 1;

/// version + three u32 params.
const PARAMS_END: usize = 1 + 4 * 3;

/// End of the authenticated header (version, params, salt).
const HEADER_LEN: usize = PARAMS_END + SALT_LEN;

/// Smallest valid v1 envelope: header + IV + tag, empty ciphertext.
pub const MIN_V1_LEN: usize = HEADER_LEN + IV_LEN + TAG_LEN;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The parts of one sealed secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub version: u8,
    pub kdf_params: KdfParams,
    pub salt: [u8; SALT_LEN],
    pub iv: [u8; IV_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Header bytes for a new envelope, before the IV and tag exist.
    ///
    /// The cipher authenticates these bytes as associated data, so the
    /// same function is used on seal (here) and on open (`header_bytes`).
    pub fn header_for(kdf_params: &KdfParams, salt: &[u8; SALT_LEN]) -> Vec<u8> {
        let mut header = Vec::with_capacity(HEADER_LEN);
        header.push(CURRENT_VERSION);
        header.extend_from_slice(&kdf_params.memory_kib.to_le_bytes());
        header.extend_from_slice(&kdf_params.iterations.to_le_bytes());
        header.extend_from_slice(&kdf_params.parallelism.to_le_bytes());
        header.extend_from_slice(salt);
        header
    }

    /// The authenticated header of this envelope.
    pub fn header_bytes(&self) -> Vec<u8> {
        let mut header = Self::header_for(&self.kdf_params, &self.salt);
        header[0] = self.version;
        header
    }

    /// Serialize to the binary layout and base64-encode it.
    pub fn encode(&self) -> String {
        let mut buf = self.header_bytes();
        buf.reserve(IV_LEN + TAG_LEN + self.ciphertext.len());
        buf.extend_from_slice(&self.iv);
        buf.extend_from_slice(&self.tag);
        buf.extend_from_slice(&self.ciphertext);
        BASE64.encode(buf)
    }

    /// Parse an envelope string produced by `encode`.
    ///
    /// Validates the version byte and the minimum length before slicing;
    /// every shortfall is a `MalformedEnvelope`.
    pub fn decode(encoded: &str) -> Result<Self> {
        let data = BASE64
            .decode(encoded.trim())
            .map_err(|e| VaultError::MalformedEnvelope(format!("invalid base64: {e}")))?;

        let Some(&version) = data.first() else {
            return Err(VaultError::MalformedEnvelope("envelope is empty".into()));
        };

        match version {
            1 => decode_v1(&data),
            other => Err(VaultError::MalformedEnvelope(format!(
                "unsupported envelope version {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Version decoders
// ---------------------------------------------------------------------------

fn decode_v1(data: &[u8]) -> Result<Envelope> {
    if data.len() < MIN_V1_LEN {
        return Err(VaultError::MalformedEnvelope(format!(
            "envelope too short: {} bytes, expected at least {MIN_V1_LEN}",
            data.len()
        )));
    }

    let kdf_params = KdfParams {
        memory_kib: read_u32(&data[1..5])?,
        iterations: read_u32(&data[5..9])?,
        parallelism: read_u32(&data[9..PARAMS_END])?,
    };
    // Refuse absurd costs before anyone tries to derive a key with them.
    kdf_params
        .validate()
        .map_err(|_| VaultError::MalformedEnvelope("KDF parameters out of range".into()))?;

    let iv_start = HEADER_LEN;
    let tag_start = iv_start + IV_LEN;
    let ct_start = tag_start + TAG_LEN;

    Ok(Envelope {
        version: 1,
        kdf_params,
        salt: to_array(&data[PARAMS_END..iv_start])?,
        iv: to_array(&data[iv_start..tag_start])?,
        tag: to_array(&data[tag_start..ct_start])?,
        ciphertext: data[ct_start..].to_vec(),
    })
}

fn read_u32(bytes: &[u8]) -> Result<u32> {
    Ok(u32::from_le_bytes(to_array(bytes)?))
}

fn to_array<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| VaultError::MalformedEnvelope("field has the wrong length".into()))
}
