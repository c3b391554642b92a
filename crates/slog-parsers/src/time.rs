//! Durations as SLURM prints them, and as slog prints them back.

use std::time::Duration;

/// Parse `[D-]HH:MM:SS`, `MM:SS` or plain seconds.
///
/// Anything else, including `UNLIMITED`, `-` and values too large for a
/// `u64` of seconds, is `None`.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let (days, clock) = match s.split_once('-') {
        Some((days, clock)) => (days.parse::<u64>().ok()?, clock),
        None => (0, s),
    };

    let fields: Vec<&str> = clock.split(':').collect();
    if fields.len() > 3 {
        return None;
    }
    let mut seconds = 0u64;
    for field in fields {
        seconds = seconds.checked_mul(60)?.checked_add(field.parse::<u64>().ok()?)?;
    }
    Some(Duration::from_secs(days.checked_mul(86_400)?.checked_add(seconds)?))
}

/// The exit status half of sacct's `exit:signal` field, 0 when unreadable.
pub fn parse_exit_code(s: &str) -> i32 {
    let status = s.split_once(':').map_or(s, |(status, _)| status);
    status.trim().parse().unwrap_or(0)
}

/// `MM:SS`, `HH:MM:SS`, or `Nd HH:MM:SS` from a day upwards.
pub fn format_duration(seconds: u64) -> String {
    let (days, rest) = (seconds / 86_400, seconds % 86_400);
    let (hours, mins, secs) = (rest / 3600, rest % 3600 / 60, rest % 60);
    match (days, hours) {
        (0, 0) => format!("{mins:02}:{secs:02}"),
        (0, _) => format!("{hours:02}:{mins:02}:{secs:02}"),
        _ => format!("{days}d {hours:02}:{mins:02}:{secs:02}"),
    }
}
