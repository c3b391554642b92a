//! `slog --list`: the newest log files in each directory.

use slog_config::LogDirs;
use slog_core::{LogStream, RecentLog, recent_logs};
use slog_view::Colorizer;
use std::io::{self, Write};

const LIST_LIMIT: usize = 10;

pub fn write_recent(out: &mut impl Write, dirs: &LogDirs, colors: &Colorizer) -> io::Result<()> {
    let theme = colors.theme();
    writeln!(out, "{}", colors.paint_bold("Recent log files:", theme.highlight))?;

    let sections = [
        ("=== Output logs ===", &dirs.out_dir, LogStream::Out, theme.success),
        ("=== Error logs ===", &dirs.err_dir, LogStream::Err, theme.error),
    ];
    for (i, (title, dir, stream, color)) in sections.into_iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{}", colors.paint(title, color))?;
        let logs = recent_logs(dir, stream, LIST_LIMIT).unwrap_or_else(|e| {
            tracing::warn!(dir = %dir, error = %e, "cannot list log directory");
            Vec::new()
        });
        for log in &logs {
            writeln!(out, "{}", colors.paint(&format_entry(log), theme.timestamp))?;
        }
    }
    out.flush()
}

/// `Jan 05 14:03     1234 name-42.out`
fn format_entry(log: &RecentLog) -> String {
    format!(
        "{} {:>8} {}",
        log.modified.format("%b %d %H:%M"),
        log.size,
        log.file_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::{Utf8Path, Utf8PathBuf};
    use chrono::{Local, TimeZone};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_entry() {
        let log = RecentLog {
            path: Utf8PathBuf::from("/logs/align-42.out"),
            size: 1234,
            modified: Local.with_ymd_and_hms(2024, 1, 5, 14, 3, 0).unwrap(),
        };
        assert_eq!(format_entry(&log), "Jan 05 14:03     1234 align-42.out");
    }

    #[test]
    fn test_write_recent_sections() {
        let temp = TempDir::new().unwrap();
        let root = Utf8Path::from_path(temp.path()).unwrap();
        let dirs = LogDirs {
            out_dir: root.join("out"),
            err_dir: root.join("missing"),
        };
        fs::create_dir(&dirs.out_dir).unwrap();
        fs::write(dirs.out_dir.join("sim-7.out"), "hello\n").unwrap();
        fs::write(dirs.out_dir.join("notes.txt"), "skip").unwrap();

        let mut out = Vec::new();
        write_recent(&mut out, &dirs, &Colorizer::disabled()).unwrap();
        let printed = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = printed.lines().collect();
        assert_eq!(lines[0], "Recent log files:");
        assert_eq!(lines[1], "=== Output logs ===");
        assert!(lines[2].ends_with("       6 sim-7.out"));
        assert_eq!(&lines[3..], ["", "=== Error logs ==="]);
    }
}
