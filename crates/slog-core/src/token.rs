//! User-supplied job tokens.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static NAME_WITH_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+)-(\d+)$").unwrap());

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("job token is empty")]
    Empty,
    #[error("job token '{0}' must not contain a path separator")]
    PathSeparator(String),
}

/// A job identifier as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobToken {
    /// `last`: the most recently written job
    Latest,
    /// Purely numeric job ID
    Id(String),
    /// `name-ID`, both parts must match
    NameWithId { name: String, id: String },
    /// Anything else is matched against job names
    Name(String),
}

impl JobToken {
    /// The job ID carried by the token, if it names one.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::Id(id) | Self::NameWithId { id, .. } => Some(id),
            Self::Latest | Self::Name(_) => None,
        }
    }
}

impl FromStr for JobToken {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TokenError::Empty);
        }
        if s.contains('/') {
            return Err(TokenError::PathSeparator(s.to_string()));
        }
        if s == "last" {
            return Ok(Self::Latest);
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Self::Id(s.to_string()));
        }
        if let Some(caps) = NAME_WITH_ID.captures(s) {
            return Ok(Self::NameWithId {
                name: caps[1].to_string(),
                id: caps[2].to_string(),
            });
        }
        Ok(Self::Name(s.to_string()))
    }
}

impl fmt::Display for JobToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("last"),
            Self::Id(id) => f.write_str(id),
            Self::NameWithId { name, id } => write!(f, "{name}-{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}
