//! `repovault import`: seal every variable of a file for a repository.
//!
//! Supported formats:
//! - `.env` files (auto-detected by extension or content)
//! - JSON files (object with string values)
//!
//! All variables are sealed under one password, each with its own salt
//! and IV.  Rows with an empty key or value are skipped.

use std::fs;
use std::path::Path;

use crate::cli::env_parser;
use crate::cli::output;
use crate::cli::{open_vault, prompt_new_password, record_activity, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `import` command.
pub fn execute(cli: &Cli, repo: &str, file_path: &str, format: Option<&str>) -> Result<()> {
    let source = Path::new(file_path);

    if !source.exists() {
        return Err(VaultError::CommandFailed(format!(
            "import file not found: {}",
            source.display()
        )));
    }

    // Detect format from flag or file extension.
    let detected_format = match format {
        Some(f) => f.to_string(),
        None => detect_format(source),
    };

    let entries = match detected_format.as_str() {
        "env" => env_parser::parse_env_file(source)?,
        "json" => parse_json_file(source)?,
        other => {
            return Err(VaultError::CommandFailed(format!(
                "unknown import format '{other}'; use 'env' or 'json'"
            )));
        }
    };

    let skipped = entries
        .iter()
        .filter(|(key, value)| key.is_empty() || value.is_empty())
        .count();

    if entries.len() == skipped {
        output::warning("No complete variables found in the import file.");
        return Ok(());
    }

    let vault = open_vault(cli)?;
    let password = prompt_new_password()?;
    let ids = vault.store_many(repo, &entries, &password)?;

    for (key, value) in &entries {
        if !key.is_empty() && !value.is_empty() {
            output::info(&format!("  + {key}"));
        }
    }
    if skipped > 0 {
        output::warning(&format!("Skipped {skipped} variable(s) with an empty key or value."));
    }

    record_activity(
        cli,
        "import",
        Some(repo),
        None,
        Some(&format!("{} secrets from {}", ids.len(), source.display())),
    );

    output::success(&format!(
        "Imported {} secrets from {} into '{repo}'",
        ids.len(),
        source.display()
    ));

    Ok(())
}

/// Detect the file format from its extension.
fn detect_format(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => "json".to_string(),
        _ => "env".to_string(), // Default to .env format.
    }
}

/// Parse a JSON file (object with string values) into key-value pairs.
fn parse_json_file(path: &Path) -> Result<Vec<(String, String)>> {
    let content = fs::read_to_string(path)
        .map_err(|e| VaultError::CommandFailed(format!("failed to read file: {e}")))?;

    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&content)
        .map_err(|e| VaultError::CommandFailed(format!("invalid JSON: {e}")))?;

    let entries = map
        .into_iter()
        .map(|(key, value)| {
            let string_value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(), // Convert non-strings to their JSON repr.
            };
            (key, string_value)
        })
        .collect();

    Ok(entries)
}
