//! `repovault list`: show which secrets a repository has.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `list` command.
///
/// Listing only touches metadata, so no password is needed.
pub fn execute(cli: &Cli, repo: &str) -> Result<()> {
    let vault = open_vault(cli)?;
    let secrets = vault.list_secrets(repo)?;

    output::info(&format!("{repo}: {} secret(s)", secrets.len()));
    output::print_secrets_table(&secrets);

    Ok(())
}
