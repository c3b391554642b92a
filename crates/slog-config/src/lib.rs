//! Configuration loading for slog.
//!
//! The config file is INI. Only `[paths]` is required; everything else has
//! a default.

pub mod config;
pub mod paths;

pub use config::{Config, ConfigError, LogDirs, load, load_from, parse_config};
pub use paths::{CONFIG_ENV_VAR, expand_tilde, home_dir, search_paths};
