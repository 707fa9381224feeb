use thiserror::Error;

/// All errors that can occur in repovault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Caller contract errors ---
    #[error("Configuration error: {0}")]
    Configuration(String),

    // --- Crypto errors ---
    /// Wrong password, tampered envelope, or corrupted ciphertext.
    /// Carries no detail about which.
    #[error("Incorrect password or corrupted secret")]
    AuthenticationFailure,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    // --- Stored data errors ---
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Secret {0} not found")]
    NotFound(String),

    // --- Persistence errors ---
    #[error("Persistence error: {0}")]
    Persistence(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl VaultError {
    /// HTTP status a web layer should answer with for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Configuration(_) => 400,
            Self::AuthenticationFailure => 403,
            Self::NotFound(_) => 404,
            Self::MalformedEnvelope(_) => 422,
            Self::Persistence(_) => 503,
            _ => 500,
        }
    }

    /// Only store failures are worth retrying; everything else is
    /// deterministic given the same inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

impl From<rusqlite::Error> for VaultError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

/// Convenience type alias for repovault results.
pub type Result<T> = std::result::Result<T, VaultError>;
