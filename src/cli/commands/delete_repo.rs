//! `repovault delete-repo`: destroy every secret of a repository.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_vault, record_activity, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `delete-repo` command.
pub fn execute(cli: &Cli, repo: &str, force: bool) -> Result<()> {
    let vault = open_vault(cli)?;
    let count = vault.list_secrets(repo)?.len();

    if count == 0 {
        output::info(&format!("No secrets stored for {repo}."));
        return Ok(());
    }

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete all {count} secret(s) of '{repo}'?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let removed = vault.delete_repository(repo)?;

    record_activity(
        cli,
        "delete-repo",
        Some(repo),
        None,
        Some(&format!("{removed} secrets")),
    );
    output::success(&format!("Deleted {removed} secret(s) of '{repo}'"));

    Ok(())
}
