//! The display state machine.

use crate::colorize::Colorizer;
use crate::mode::{Action, DisplayMode};
use crate::pager::{Pager, PagerError};
use crate::watch::WatchOutcome;
use slog_core::ResolvedLog;
use slog_slurm::StatusQuerier;
use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PresentError {
    #[error("No log files found to follow for job {job_id}")]
    NothingToFollow { job_id: String },
    #[error(transparent)]
    Pager(#[from] PagerError),
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Knobs for the presenter, filled from config and CLI flags.
#[derive(Debug, Clone)]
pub struct PresenterOptions {
    /// Hand dumps to the pager (only sensible on a terminal)
    pub use_pager: bool,

    /// Poll interval for watch mode
    pub watch_interval: Duration,

    /// Give up watching after this long and dump anyway
    pub max_wait: Option<Duration>,

    /// Job status refresh in follow mode, `None` disables it
    pub status_interval: Option<Duration>,

    /// Fallback file poll interval in follow mode
    pub follow_poll_interval: Duration,

    /// Lines of existing content shown when follow starts
    pub tail_lines: usize,
}

impl Default for PresenterOptions {
    fn default() -> Self {
        Self {
            use_pager: true,
            watch_interval: Duration::from_secs(10),
            max_wait: None,
            status_interval: Some(Duration::from_secs(10)),
            follow_poll_interval: Duration::from_secs(1),
            tail_lines: 10,
        }
    }
}

/// Renders resolved logs to a writer.
///
/// The pager and the status querier are injected so they can be replaced
/// in tests without spawning processes.
pub struct Presenter<P, Q, W> {
    pub(crate) colors: Colorizer,
    pub(crate) pager: P,
    pub(crate) querier: Q,
    pub(crate) options: PresenterOptions,
    pub(crate) out: W,
}

impl<P: Pager, Q: StatusQuerier, W: Write> Presenter<P, Q, W> {
    pub fn new(colors: Colorizer, pager: P, querier: Q, options: PresenterOptions, out: W) -> Self {
        Self {
            colors,
            pager,
            querier,
            options,
            out,
        }
    }

    /// Consume the presenter and return its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Show `resolved` according to `mode`.
    ///
    /// `shutdown` resolves when the user interrupts; follow and watch stop
    /// at that point and any child process is killed.
    pub async fn present(
        &mut self,
        resolved: &ResolvedLog,
        mode: DisplayMode,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), PresentError> {
        tokio::pin!(shutdown);
        tracing::debug!(job_id = %resolved.job_id, ?mode, "presenting job logs");

        self.write_job_header(resolved)?;
        match mode.action {
            Action::Dump => self.dump(resolved, mode.streams, shutdown.as_mut()).await,
            Action::Follow => self.follow(resolved, mode.streams, shutdown.as_mut()).await,
            Action::Watch => {
                match self.watch(&resolved.job_id, shutdown.as_mut()).await? {
                    WatchOutcome::Interrupted => return Ok(()),
                    outcome => tracing::debug!(?outcome, "watch finished"),
                }
                self.dump(resolved, mode.streams, shutdown.as_mut()).await
            }
        }
    }

    /// `Job: <name> (ID: <id>)`
    pub(crate) fn write_job_header(&mut self, resolved: &ResolvedLog) -> io::Result<()> {
        let theme = self.colors.theme();
        let name = self.colors.paint(&resolved.name, theme.job_name);
        let id = self.colors.paint(&resolved.job_id, theme.highlight);
        writeln!(self.out, "Job: {} (ID: {})", name, id)
    }

    /// A full-line message in `color`.
    pub(crate) fn notice(&mut self, text: &str, color: crossterm::style::Color) -> io::Result<()> {
        let line = self.colors.paint(text, color);
        writeln!(self.out, "{}", line)?;
        self.out.flush()
    }
}
