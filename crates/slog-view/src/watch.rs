//! Watch mode: poll the scheduler until the job leaves the queue.

use crate::colorize::Colorizer;
use crate::pager::Pager;
use crate::presenter::{PresentError, Presenter};
use slog_parsers::format_duration;
use slog_slurm::{FinalState, JobActivity, Outcome, StatusQuerier};
use std::future::Future;
use std::io::{self, Write};
use std::pin::Pin;
use tokio::time::{Instant, sleep};

/// How a watch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The job left the queue
    Finished(Option<FinalState>),
    /// The status command failed; logs are shown right away
    QueryFailed,
    /// `max_wait` elapsed before the job finished
    TimedOut,
    /// The user interrupted
    Interrupted,
}

impl<P: Pager, Q: StatusQuerier, W: Write> Presenter<P, Q, W> {
    /// Block until `job_id` finishes, the status query fails, `max_wait`
    /// runs out, or `shutdown` fires.
    pub async fn watch(
        &mut self,
        job_id: &str,
        mut shutdown: Pin<&mut impl Future<Output = ()>>,
    ) -> Result<WatchOutcome, PresentError> {
        let theme_warning = self.colors.theme().warning;
        let theme_success = self.colors.theme().success;
        let theme_highlight = self.colors.theme().highlight;

        self.notice(&format!("Watching job {job_id}..."), theme_highlight)?;

        let started = Instant::now();
        let mut printed_progress = false;

        let outcome = loop {
            let activity = tokio::select! {
                res = self.querier.query(job_id) => res,
                _ = &mut shutdown => break WatchOutcome::Interrupted,
            };

            match activity {
                Ok(JobActivity::Active(entry)) => {
                    tracing::debug!(job_id, state = %entry.state, "job still active");
                    let dot = self.colors.paint(".", theme_warning);
                    write!(self.out, "{}", dot)?;
                    self.out.flush()?;
                    printed_progress = true;
                }
                Ok(JobActivity::Finished(final_state)) => {
                    break WatchOutcome::Finished(final_state);
                }
                Err(e) => {
                    tracing::warn!(job_id, error = %e, "job status query failed, showing logs now");
                    break WatchOutcome::QueryFailed;
                }
            }

            let mut pause = self.options.watch_interval;
            if let Some(max_wait) = self.options.max_wait {
                let Some(remaining) = max_wait.checked_sub(started.elapsed()).filter(|r| !r.is_zero())
                else {
                    tracing::warn!(job_id, "job still active after max wait");
                    break WatchOutcome::TimedOut;
                };
                // The last poll lands on the deadline, not an interval past it.
                pause = pause.min(remaining);
            }

            tokio::select! {
                _ = sleep(pause) => {}
                _ = &mut shutdown => break WatchOutcome::Interrupted,
            }
        };

        if printed_progress {
            writeln!(self.out)?;
        }

        match &outcome {
            WatchOutcome::Finished(final_state) => {
                self.notice(&format!("Job {job_id} completed! Showing logs:"), theme_success)?;
                if let Some(state) = final_state {
                    self.write_final_state(state)?;
                }
                writeln!(self.out)?;
            }
            WatchOutcome::QueryFailed => {
                self.notice(
                    &format!("Could not query status of job {job_id}, showing logs now"),
                    theme_warning,
                )?;
            }
            WatchOutcome::TimedOut => {
                let waited = format_duration(started.elapsed().as_secs());
                self.notice(
                    &format!("Job {job_id} still active after {waited}, showing logs now"),
                    theme_warning,
                )?;
            }
            WatchOutcome::Interrupted => {
                self.notice("Stopped watching job", theme_warning)?;
            }
        }

        Ok(outcome)
    }

    pub(crate) fn write_final_state(&mut self, state: &FinalState) -> io::Result<()> {
        writeln!(self.out, "{}", final_state_line(&self.colors, state))
    }
}

/// `Status: ...` colored by how the job ended.
pub(crate) fn final_state_line(colors: &Colorizer, state: &FinalState) -> String {
    let theme = colors.theme();
    let color = match state.outcome() {
        Outcome::Success => theme.success,
        Outcome::Failure => theme.error,
        Outcome::Other => theme.warning,
    };
    colors.paint_bold(&state.describe(), color).into_owned()
}
