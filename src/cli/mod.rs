//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod env_parser;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::activity::ActivityLog;
use crate::config::Settings;
use crate::crypto::validate_password;
use crate::errors::{Result, VaultError};
use crate::store::SqliteRecordStore;
use crate::vault::VaultService;

/// Environment variable consulted before prompting for a password.
pub const PASSWORD_ENV: &str = "REPOVAULT_PASSWORD";

/// repovault CLI: password-sealed deployment secrets for repositories.
#[derive(Parser)]
#[command(
    name = "repovault",
    about = "Password-sealed deployment secrets for your repositories",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory holding the secret database (default: from .repovault.toml, else .repovault)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// User recorded in the activity log
    #[arg(long, global = true, env = "REPOVAULT_USER", default_value = "local")]
    pub user: String,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Encrypt and store a secret for a repository (add or replace)
    Set {
        /// Repository the secret belongs to
        #[arg(short, long)]
        repo: String,
        /// Variable name (e.g. DATABASE_URL)
        key: String,
        /// Secret value (omit for interactive prompt)
        value: Option<String>,
    },

    /// Import variables from a .env or JSON file into a repository
    Import {
        /// Repository the secrets belong to
        #[arg(short, long)]
        repo: String,
        /// Path to the file to import
        file: String,
        /// Import format: env (default) or json (auto-detected from extension)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Decrypt a secret by record id
    Reveal {
        /// Record id printed by `set`
        record_id: String,
    },

    /// Decrypt a secret by repository and variable name
    Get {
        /// Repository the secret belongs to
        #[arg(short, long)]
        repo: String,
        /// Variable name
        key: String,
    },

    /// List the secrets of a repository (names only)
    List {
        /// Repository to list
        #[arg(short, long)]
        repo: String,
    },

    /// Delete every secret of a repository
    DeleteRepo {
        /// Repository to delete
        repo: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// View the activity log
    Activity {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the password for opening secrets, trying in order:
/// 1. `REPOVAULT_PASSWORD` env var (CI/CD)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a password used to seal new secrets, with confirmation.
///
/// Also respects `REPOVAULT_PASSWORD` for scripted/CI usage.  The length
/// policy is enforced here so the user can retry instead of failing.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        validate_password(&pw)?;
        return Ok(pw);
    }

    loop {
        let password = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose password")
                .with_confirmation("Confirm password", "Passwords do not match, try again")
                .interact()
                .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?,
        );

        if let Err(e) = validate_password(&password) {
            output::warning(&format!("{e}. Try again."));
            continue;
        }

        return Ok(password);
    }
}

fn password_from_env() -> Option<Zeroizing<String>> {
    match std::env::var(PASSWORD_ENV) {
        Ok(pw) if !pw.is_empty() => Some(Zeroizing::new(pw)),
        _ => None,
    }
}

/// Load project settings, applying the `--data-dir` override.
pub fn load_settings(cli: &Cli) -> Result<(PathBuf, Settings)> {
    let cwd = std::env::current_dir()?;
    let mut settings = Settings::load(&cwd)?;
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    Ok((cwd, settings))
}

/// Resolve the data directory from the CLI flag or the project settings.
pub fn data_dir(cli: &Cli) -> Result<PathBuf> {
    let (cwd, settings) = load_settings(cli)?;
    Ok(settings.data_path(&cwd))
}

/// Open the secret database and build a vault over it.
///
/// KDF params for new envelopes come from `.repovault.toml`.
pub fn open_vault(cli: &Cli) -> Result<VaultService<SqliteRecordStore>> {
    let (cwd, settings) = load_settings(cli)?;
    let store = SqliteRecordStore::open(&settings.database_path(&cwd))?;
    VaultService::new(store, settings.kdf_params())
}

/// Log an activity event using the CLI context.
///
/// Opens the activity database, logs the event, and silently ignores any
/// errors.  This never fails the parent operation.
pub fn record_activity(
    cli: &Cli,
    action: &str,
    repository_id: Option<&str>,
    key_name: Option<&str>,
    details: Option<&str>,
) {
    let Ok(dir) = data_dir(cli) else {
        return;
    };

    if let Some(log) = ActivityLog::open(&dir) {
        log.log(&cli.user, action, repository_id, key_name, details);
    }
}
