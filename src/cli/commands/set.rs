//! `repovault set`: encrypt and store one secret for a repository.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_vault, prompt_new_password, record_activity, Cli};
use crate::errors::{Result, VaultError};
use crate::store::RecordStore;

/// Execute the `set` command.
pub fn execute(cli: &Cli, repo: &str, key: &str, value: Option<&str>) -> Result<()> {
    // Determine the secret value from one of three sources.
    let secret_value = if let Some(v) = value {
        // Source 1: Inline value on the command line.
        output::warning("Value provided on command line; it may appear in shell history.");
        Zeroizing::new(v.to_string())
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        Zeroizing::new(buf.trim_end().to_string())
    } else {
        // Source 3: Interactive secure prompt (default).
        Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt(format!("Enter value for {key}"))
                .allow_empty_password(true)
                .interact()
                .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?,
        )
    };

    let vault = open_vault(cli)?;
    let existed = vault.store().find(repo, key)?.is_some();

    let password = prompt_new_password()?;
    let record_id = vault.store_secret(repo, key, &secret_value, &password)?;

    let op_detail = if existed { "replaced" } else { "added" };
    record_activity(cli, "store", Some(repo), Some(key), Some(op_detail));

    output::success(&format!("Secret '{key}' {op_detail} for {repo}"));
    println!("{record_id}");
    output::tip(&format!("Reveal it with: repovault reveal {record_id}"));

    Ok(())
}
