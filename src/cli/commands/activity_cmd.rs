//! `repovault activity`: display the activity log.
//!
//! Usage:
//!   repovault activity               # show last 50 entries
//!   repovault activity --last 20     # show last 20
//!   repovault activity --since 7d    # entries from last 7 days

use chrono::Utc;

use crate::activity::{ActivityEntry, ActivityLog};
use crate::cli::output;
use crate::cli::{data_dir, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `activity` command.
pub fn execute(cli: &Cli, last: usize, since: Option<&str>) -> Result<()> {
    let dir = data_dir(cli)?;
    if !dir.exists() {
        output::info("No activity recorded yet.");
        return Ok(());
    }

    let log = ActivityLog::open(&dir)
        .ok_or_else(|| VaultError::Persistence("failed to open activity database".into()))?;

    let since_dt = match since {
        Some(s) => Some(parse_duration(s)?),
        None => None,
    };

    let entries = log.query(last, since_dt)?;

    if entries.is_empty() {
        output::info("No activity entries found.");
        return Ok(());
    }

    print_activity_table(&entries);

    Ok(())
}

/// Parse a human-friendly duration string like "7d", "24h", "30m".
fn parse_duration(input: &str) -> Result<chrono::DateTime<Utc>> {
    let input = input.trim();

    let (num_str, unit) = if let Some(s) = input.strip_suffix('d') {
        (s, 'd')
    } else if let Some(s) = input.strip_suffix('h') {
        (s, 'h')
    } else if let Some(s) = input.strip_suffix('m') {
        (s, 'm')
    } else {
        return Err(VaultError::CommandFailed(format!(
            "invalid duration '{input}'; use format like 7d, 24h, or 30m"
        )));
    };

    let num: i64 = num_str.parse().map_err(|_| {
        VaultError::CommandFailed(format!(
            "invalid duration '{input}'; number part is not valid"
        ))
    })?;

    let duration = match unit {
        'd' => chrono::Duration::try_days(num),
        'h' => chrono::Duration::try_hours(num),
        _ => chrono::Duration::try_minutes(num),
    };

    duration
        .and_then(|d| Utc::now().checked_sub_signed(d))
        .ok_or_else(|| VaultError::CommandFailed(format!("duration '{input}' out of range")))
}

/// Print activity entries in a formatted table.
pub fn print_activity_table(entries: &[ActivityEntry]) {
    use comfy_table::{ContentArrangement, Table};
    use console::style;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "User", "Action", "Repository", "Key", "Details"]);

    for entry in entries {
        let time = entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        let action = colorize_action(&entry.action);
        let repo = entry.repository_id.as_deref().unwrap_or("-");
        let key = entry.key_name.as_deref().unwrap_or("-");
        let details = entry.details.as_deref().unwrap_or("-");

        table.add_row(vec![
            time,
            entry.user_id.clone(),
            action,
            repo.to_string(),
            key.to_string(),
            details.to_string(),
        ]);
    }

    println!(
        "{}",
        style(format!("{} activity entries:", entries.len())).bold()
    );
    println!("{table}");
}

/// Colorize action names for display.
fn colorize_action(action: &str) -> String {
    use console::style;

    match action {
        "store" | "import" => style(action).green().to_string(),
        "reveal" => style(action).blue().to_string(),
        "delete-repo" => style(action).red().to_string(),
        _ => action.to_string(),
    }
}
