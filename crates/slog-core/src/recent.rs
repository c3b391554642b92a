//! Recently written log files, for `slog --list`.

use crate::filename::LogStream;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};
use std::fs;
use std::io;

/// A log file with the metadata shown in listings.
#[derive(Debug, Clone)]
pub struct RecentLog {
    pub path: Utf8PathBuf,
    pub size: u64,
    pub modified: DateTime<Local>,
}

impl RecentLog {
    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or(self.path.as_str())
    }
}

/// The `limit` newest files in `dir` with the stream's extension.
///
/// A missing directory yields an empty list.
pub fn recent_logs(dir: &Utf8Path, stream: LogStream, limit: usize) -> io::Result<Vec<RecentLog>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut logs: Vec<RecentLog> = entries
        .flatten()
        .filter_map(|entry| {
            let path = Utf8PathBuf::try_from(entry.path()).ok()?;
            if path.extension() != Some(stream.extension()) {
                return None;
            }
            let metadata = entry.metadata().ok()?;
            if !metadata.is_file() {
                return None;
            }
            Some(RecentLog {
                path,
                size: metadata.len(),
                modified: metadata.modified().ok()?.into(),
            })
        })
        .collect();

    logs.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.path.cmp(&b.path))
    });
    logs.truncate(limit);
    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn touch(dir: &Utf8Path, name: &str, mtime: u64, bytes: &[u8]) {
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000 + mtime))
            .unwrap();
    }

    #[test]
    fn test_newest_first_and_limited() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        touch(dir, "a-1.out", 10, b"abc");
        touch(dir, "b-2.out", 30, b"");
        touch(dir, "c-3.out", 20, b"");
        touch(dir, "c-3.err", 40, b"");

        let logs = recent_logs(dir, LogStream::Out, 2).unwrap();
        let names: Vec<&str> = logs.iter().map(RecentLog::file_name).collect();
        assert_eq!(names, vec!["b-2.out", "c-3.out"]);

        let all = recent_logs(dir, LogStream::Out, 10).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].size, 3);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let logs = recent_logs(Utf8Path::new("/nonexistent/slog"), LogStream::Err, 10).unwrap();
        assert!(logs.is_empty());
    }
}
