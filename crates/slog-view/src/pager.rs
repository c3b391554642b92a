//! External pager for dump mode.

use std::io;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum PagerError {
    #[error("pager '{program}' is not available: {source}")]
    Unavailable {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("pager '{program}' failed: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Something that can show a document interactively.
#[allow(async_fn_in_trait)]
pub trait Pager {
    async fn page(&self, content: &str) -> Result<(), PagerError>;
}

/// Pipes the document into an external program such as `less`.
#[derive(Debug, Clone)]
pub struct CommandPager {
    command: String,
}

impl CommandPager {
    /// `command` is split on whitespace, so `less -S` works.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Pager for CommandPager {
    async fn page(&self, content: &str) -> Result<(), PagerError> {
        let mut words = self.command.split_whitespace();
        let program = words.next().unwrap_or("less").to_string();

        let mut cmd = Command::new(&program);
        cmd.args(words).stdin(Stdio::piped()).kill_on_drop(true);
        // Keep ANSI colors intact unless the user configured less themselves.
        if std::env::var_os("LESS").is_none() {
            cmd.env("LESS", "-R");
        }

        tracing::debug!(pager = %program, "starting pager");
        let mut child = cmd.spawn().map_err(|source| PagerError::Unavailable {
            program: program.clone(),
            source,
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(content.as_bytes()).await {
                // The user quit before reading everything.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Err(source) => return Err(PagerError::Io { program, source }),
                Ok(()) => {}
            }
        }

        child
            .wait()
            .await
            .map_err(|source| PagerError::Io { program, source })?;
        Ok(())
    }
}
