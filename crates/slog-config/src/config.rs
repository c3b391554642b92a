//! Parsed slog configuration.

use crate::paths::{CONFIG_ENV_VAR, exe_dir, expand_tilde, home_dir, search_paths};
use camino::{Utf8Path, Utf8PathBuf};
use ini::{Ini, Properties};
use slog_parsers::parse_duration;
use std::fs;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PAGER: &str = "less";
const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No configuration file found")]
    NotFound { searched: Vec<Utf8PathBuf> },
    #[error("Invalid configuration file {path}: {reason}")]
    Invalid { path: Utf8PathBuf, reason: String },
}

/// The stdout and stderr log directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDirs {
    pub out_dir: Utf8PathBuf,
    pub err_dir: Utf8PathBuf,
}

/// Process-wide configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where SLURM writes job logs
    pub dirs: LogDirs,

    /// Pager program for dump mode
    pub pager: String,

    /// Status poll interval for watch and follow modes
    pub watch_interval: Duration,

    /// Give up watching after this long
    pub max_wait: Option<Duration>,

    /// `[logging] level`, an EnvFilter directive
    pub log_level: Option<String>,

    /// File this config was read from
    pub source: Utf8PathBuf,
}

/// Load the config from `$SLOG_CONFIG` or the first existing search path.
pub fn load() -> Result<Config, ConfigError> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
        let path = Utf8PathBuf::from(explicit);
        if !path.exists() {
            return Err(ConfigError::NotFound {
                searched: vec![path],
            });
        }
        return load_from(&path);
    }

    let home = home_dir();
    let searched = search_paths(home.as_deref(), exe_dir().as_deref());
    match searched.iter().find(|p| p.exists()) {
        Some(path) => load_from(path),
        None => Err(ConfigError::NotFound { searched }),
    }
}

/// Load and validate a specific config file.
pub fn load_from(path: &Utf8Path) -> Result<Config, ConfigError> {
    tracing::debug!(path = %path, "loading config");
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_config(&content, path, home_dir().as_deref())
}

/// Parse config file content. `path` is only used for error messages.
pub fn parse_config(
    content: &str,
    path: &Utf8Path,
    home: Option<&Utf8Path>,
) -> Result<Config, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        path: path.to_path_buf(),
        reason,
    };

    let ini = Ini::load_from_str(content).map_err(|e| invalid(e.to_string()))?;

    let paths = ini
        .section(Some("paths"))
        .ok_or_else(|| invalid("missing section [paths]".to_string()))?;
    let required = |key: &str| -> Result<Utf8PathBuf, ConfigError> {
        match paths.get(key).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(expand_tilde(value, home)),
            Some(_) => Err(invalid(format!("[paths] {key} is empty"))),
            None => Err(invalid(format!("missing key {key} in section [paths]"))),
        }
    };
    let dirs = LogDirs {
        out_dir: required("logs_out_dir")?,
        err_dir: required("logs_err_dir")?,
    };

    let pager = optional(&ini, "display", "pager")
        .unwrap_or(DEFAULT_PAGER)
        .to_string();

    let watch_interval = match optional(&ini, "watch", "interval") {
        Some(raw) => match parse_duration(raw) {
            Some(d) if !d.is_zero() => d,
            _ => return Err(invalid(format!("[watch] interval: invalid duration '{raw}'"))),
        },
        None => DEFAULT_WATCH_INTERVAL,
    };

    let max_wait = match optional(&ini, "watch", "max_wait") {
        Some(raw) => Some(
            parse_duration(raw)
                .ok_or_else(|| invalid(format!("[watch] max_wait: invalid duration '{raw}'")))?,
        ),
        None => None,
    };

    let log_level = optional(&ini, "logging", "level").map(str::to_string);

    Ok(Config {
        dirs,
        pager,
        watch_interval,
        max_wait,
        log_level,
        source: path.to_path_buf(),
    })
}

fn optional<'a>(ini: &'a Ini, section: &str, key: &str) -> Option<&'a str> {
    ini.section(Some(section))
        .and_then(|props: &Properties| props.get(key))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
