//! Resolve a job token to its log files.
//!
//! Both log directories are scanned, every `name-id.out|err` file is grouped
//! by `(name, id)`, and the token picks among the groups:
//!
//! 1. a numeric token matches job IDs only,
//! 2. `name-ID` needs both parts to match exactly,
//! 3. a bare name matches exact names, then name prefixes, then substrings.
//!
//! When several jobs qualify the newest one wins: latest modification time,
//! then the higher job ID, then the greater `name-id` string.

use crate::filename::{LogFileName, LogStream};
use crate::token::JobToken;
use camino::{Utf8Path, Utf8PathBuf};
use slog_config::LogDirs;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("No log files found for job '{token}'")]
    NotFound { token: String },
}

/// The log files of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLog {
    /// Job name taken from the file name
    pub name: String,

    /// SLURM job ID
    pub job_id: String,

    /// Where the stdout log lives (or will live)
    pub out: Utf8PathBuf,

    /// Where the stderr log lives (or will live)
    pub err: Utf8PathBuf,
}

impl ResolvedLog {
    /// Expected log locations for a job.
    pub fn for_job(dirs: &LogDirs, name: &str, job_id: &str) -> Self {
        Self {
            name: name.to_string(),
            job_id: job_id.to_string(),
            out: dirs.out_dir.join(LogFileName::render(name, job_id, LogStream::Out)),
            err: dirs.err_dir.join(LogFileName::render(name, job_id, LogStream::Err)),
        }
    }

    pub fn path(&self, stream: LogStream) -> &Utf8Path {
        match stream {
            LogStream::Out => &self.out,
            LogStream::Err => &self.err,
        }
    }

    /// The path for `stream` if the file currently exists.
    pub fn existing(&self, stream: LogStream) -> Option<&Utf8Path> {
        let path = self.path(stream);
        path.is_file().then_some(path)
    }
}

/// One `(name, id)` group found on disk.
#[derive(Debug, Clone)]
struct Candidate {
    name: String,
    id: String,
    modified: SystemTime,
}

impl Candidate {
    /// Ordering used to pick the newest among several matches.
    fn recency(&self, other: &Self) -> Ordering {
        self.modified
            .cmp(&other.modified)
            .then_with(|| self.id.len().cmp(&other.id.len()))
            .then_with(|| self.id.cmp(&other.id))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Resolve `token` against the log directories.
pub fn resolve(token: &JobToken, dirs: &LogDirs) -> Result<ResolvedLog, ResolveError> {
    let candidates = scan(dirs);
    tracing::debug!(
        token = %token,
        candidates = candidates.len(),
        "resolving job token"
    );

    let winner = match token {
        JobToken::Latest => newest(candidates.iter()),
        JobToken::Id(id) => newest(candidates.iter().filter(|c| &c.id == id)),
        JobToken::NameWithId { name, id } => {
            newest(candidates.iter().filter(|c| &c.name == name && &c.id == id))
        }
        JobToken::Name(name) => {
            let name = name.as_str();
            newest(candidates.iter().filter(|c| c.name == name))
                .or_else(|| newest(candidates.iter().filter(|c| c.name.starts_with(name))))
                .or_else(|| newest(candidates.iter().filter(|c| c.name.contains(name))))
        }
    };

    match winner {
        Some(c) => {
            tracing::debug!(name = %c.name, job_id = %c.id, "resolved job");
            Ok(ResolvedLog::for_job(dirs, &c.name, &c.id))
        }
        None => Err(ResolveError::NotFound {
            token: token.to_string(),
        }),
    }
}

/// The most recently written job in either directory.
pub fn latest(dirs: &LogDirs) -> Option<ResolvedLog> {
    resolve(&JobToken::Latest, dirs).ok()
}

fn newest<'a>(candidates: impl Iterator<Item = &'a Candidate>) -> Option<&'a Candidate> {
    candidates.max_by(|a, b| a.recency(b))
}

/// Collect every job that has at least one log file.
fn scan(dirs: &LogDirs) -> Vec<Candidate> {
    let mut groups: BTreeMap<(String, String), SystemTime> = BTreeMap::new();

    for (dir, stream) in [(&dirs.out_dir, LogStream::Out), (&dirs.err_dir, LogStream::Err)] {
        let entries = match list_logs(dir, stream) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(dir = %dir, "log directory does not exist");
                continue;
            }
            Err(e) => {
                tracing::warn!(dir = %dir, error = %e, "failed to read log directory");
                continue;
            }
        };

        for (parsed, modified) in entries {
            let slot = groups
                .entry((parsed.name, parsed.id))
                .or_insert(SystemTime::UNIX_EPOCH);
            *slot = (*slot).max(modified);
        }
    }

    groups
        .into_iter()
        .map(|((name, id), modified)| Candidate { name, id, modified })
        .collect()
}

/// Log files of one stream in `dir`, with their modification times.
fn list_logs(dir: &Utf8Path, stream: LogStream) -> io::Result<Vec<(LogFileName, SystemTime)>> {
    let mut logs = Vec::new();
    for entry in fs::read_dir(dir)?.flatten() {
        let file_name = entry.file_name();
        let Some(parsed) = file_name.to_str().and_then(LogFileName::parse) else {
            continue;
        };
        if parsed.stream != stream {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        logs.push((parsed, modified));
    }
    Ok(logs)
}
