//! Running scheduler commands.

use std::io;
use std::process::Output;
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to execute {command}: {source}")]
    Execution {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("Command {command} failed: {stderr}")]
    Failed { command: String, stderr: String },
}

impl CommandError {
    /// True when the program itself is not installed.
    pub fn is_missing_program(&self) -> bool {
        matches!(self, Self::Execution { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }

    /// Trimmed stderr of a command that ran and exited non-zero.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => Some(stderr),
            Self::Execution { .. } => None,
        }
    }
}

/// Run `cmd` to completion and return its stdout.
///
/// Dropping the future kills the child.
pub async fn run_command(cmd: &mut Command, name: &str) -> Result<String, CommandError> {
    let Output {
        status,
        stdout,
        stderr,
    } = spawn_and_wait(cmd, name).await?;

    if !status.success() {
        tracing::debug!(command = name, %status, "command exited unsuccessfully");
        return Err(CommandError::Failed {
            command: name.to_string(),
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&stdout).into_owned())
}

async fn spawn_and_wait(cmd: &mut Command, name: &str) -> Result<Output, CommandError> {
    tracing::debug!(command = name, "running scheduler command");
    cmd.kill_on_drop(true)
        .output()
        .await
        .map_err(|source| CommandError::Execution {
            command: name.to_string(),
            source,
        })
}
