//! `repovault get`: decrypt a secret by repository and key name.

use crate::cli::{open_vault, prompt_password, record_activity, Cli};
use crate::errors::Result;

/// Execute the `get` command.
pub fn execute(cli: &Cli, repo: &str, key: &str) -> Result<()> {
    let vault = open_vault(cli)?;

    let password = prompt_password()?;
    let value = vault.reveal_by_key(repo, key, &password)?;

    record_activity(cli, "reveal", Some(repo), Some(key), None);

    println!("{}", value.as_str());

    Ok(())
}
