//! `repovault reveal`: decrypt a secret by record id.

use crate::cli::{open_vault, prompt_password, record_activity, Cli};
use crate::errors::Result;

/// Execute the `reveal` command.
pub fn execute(cli: &Cli, record_id: &str) -> Result<()> {
    let vault = open_vault(cli)?;

    let password = prompt_password()?;
    let value = vault.reveal_secret(record_id, &password)?;

    record_activity(cli, "reveal", None, None, Some(record_id));

    // Decrypted value goes to stdout and nowhere else.
    println!("{}", value.as_str());

    Ok(())
}
