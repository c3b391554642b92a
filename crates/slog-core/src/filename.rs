//! SLURM log file names: `<job name>-<job id>.out|err`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static LOG_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<name>.+)-(?P<id>\d+)\.(?P<ext>out|err)$").unwrap());

/// Which of a job's two log streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogStream {
    Out,
    Err,
}

impl LogStream {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Out => "out",
            Self::Err => "err",
        }
    }
}

impl fmt::Display for LogStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Out => "output",
            Self::Err => "error",
        })
    }
}

/// A log file name split into its job name, job ID and stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileName {
    pub name: String,
    pub id: String,
    pub stream: LogStream,
}

impl LogFileName {
    /// Parse a bare file name. Returns `None` for anything that is not a
    /// `name-id.out` or `name-id.err` log.
    pub fn parse(file_name: &str) -> Option<Self> {
        let caps = LOG_FILE.captures(file_name)?;
        let stream = match &caps["ext"] {
            "out" => LogStream::Out,
            _ => LogStream::Err,
        };
        Some(Self {
            name: caps["name"].to_string(),
            id: caps["id"].to_string(),
            stream,
        })
    }

    /// Build the file name for a job and stream.
    pub fn render(name: &str, id: &str, stream: LogStream) -> String {
        format!("{}-{}.{}", name, id, stream.extension())
    }
}
