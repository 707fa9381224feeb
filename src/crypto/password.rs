//! Password policy shared by every entry point.
//!
//! Passwords are 6 to 16 characters, counted as Unicode scalar values
//! so that a non-ASCII password is measured the way the user typed it.

use crate::errors::{Result, VaultError};

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Longest accepted password, in characters.
pub const MAX_PASSWORD_LEN: usize = 16;

/// Reject passwords outside the accepted length range.
///
/// Runs before any key derivation so a bad password costs nothing.
pub fn validate_password(password: &str) -> Result<()> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(VaultError::Configuration(format!(
            "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
