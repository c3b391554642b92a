//! Top-level errors and their exit codes.

use miette::Diagnostic;
use slog_config::ConfigError;
use slog_core::ResolveError;
use slog_view::PresentError;
use std::io;
use std::process::ExitCode;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum AppError {
    #[error("No configuration file found")]
    #[diagnostic(code(slog::config::not_found))]
    ConfigNotFound {
        #[help]
        help: String,
    },

    #[error(transparent)]
    #[diagnostic(
        code(slog::config::invalid),
        help("[paths] must set logs_out_dir and logs_err_dir")
    )]
    ConfigInvalid(ConfigError),

    #[error(transparent)]
    #[diagnostic(
        code(slog::not_found),
        help("Run `slog --list` to see recent log files")
    )]
    NotFound(#[from] ResolveError),

    #[error(transparent)]
    #[diagnostic(code(slog::present))]
    Present(#[from] PresentError),

    #[error("Failed to write output: {0}")]
    #[diagnostic(code(slog::io))]
    Io(#[from] io::Error),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { searched } => {
                let mut help = String::from("Create a config file in one of:");
                for path in &searched {
                    help.push_str("\n  ");
                    help.push_str(path.as_str());
                }
                help.push_str("\nwith a [paths] section setting logs_out_dir and logs_err_dir");
                Self::ConfigNotFound { help }
            }
            invalid => Self::ConfigInvalid(invalid),
        }
    }
}

impl AppError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::ConfigNotFound { .. } | Self::ConfigInvalid(_) => ExitCode::from(3),
            Self::NotFound(_) => ExitCode::from(4),
            Self::Present(_) | Self::Io(_) => ExitCode::FAILURE,
        }
    }

    /// The reader went away (e.g. `slog 1 | head`); not worth reporting.
    pub fn is_broken_pipe(&self) -> bool {
        let io_err = match self {
            Self::Io(e) | Self::Present(PresentError::Io(e)) => e,
            _ => return false,
        };
        io_err.kind() == io::ErrorKind::BrokenPipe
    }
}
