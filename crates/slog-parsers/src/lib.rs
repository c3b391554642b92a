//! Helpers shared by the scheduler and config crates: running commands,
//! splitting `|`-delimited output, and SLURM duration fields.

pub mod command;
pub mod time;

pub use command::{CommandError, run_command};
pub use time::{format_duration, parse_duration, parse_exit_code};

/// Values SLURM prints for "nothing here".
const PLACEHOLDERS: &[&str] = &["", "-", "N/A", "None", "(None)", "Unknown"];

/// Trimmed field, or `None` when it is empty or a placeholder.
pub fn non_empty_string(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!PLACEHOLDERS.contains(&trimmed)).then(|| trimmed.to_string())
}

/// Split a `|`-delimited line into exactly `fields` parts.
///
/// The last part keeps any further `|` so free-text columns survive.
pub fn split_delimited(line: &str, fields: usize) -> Result<Vec<&str>, String> {
    let parts: Vec<&str> = line.splitn(fields, '|').collect();
    if parts.len() < fields {
        return Err(format!("Expected {} fields, got {}: {}", fields, parts.len(), line));
    }
    Ok(parts)
}
