//! CLI argument parsing for slog.

use clap::Parser;
use slog_core::JobToken;
use slog_view::{Action, DisplayMode, Streams};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "slog")]
#[command(version)]
#[command(about = "View SLURM job logs by job ID, name, or name-ID")]
#[command(after_help = "Examples:\n  \
    slog 12345            show the output log of job 12345\n  \
    slog my_job -e        show the error log of the newest my_job\n  \
    slog my_job-12345 -b  show both logs\n  \
    slog 12345 -f         follow the output log\n  \
    slog 12345 -w         wait for the job to finish, then show logs\n  \
    slog last             show the most recently written job")]
pub struct Args {
    /// Job ID, job name, `name-ID`, or `last`
    #[arg(required_unless_present = "list")]
    pub job: Option<JobToken>,

    /// Follow the log in real time
    #[arg(short, long, conflicts_with = "watch")]
    pub follow: bool,

    /// Show the error log instead of the output log
    #[arg(short, long)]
    pub error: bool,

    /// Show both output and error logs
    #[arg(short, long)]
    pub both: bool,

    /// Wait for the job to finish, then show its logs
    #[arg(short, long)]
    pub watch: bool,

    /// Disable colorized output
    #[arg(long)]
    pub no_color: bool,

    /// List recent log files
    #[arg(short, long)]
    pub list: bool,

    /// Show the job's squeue entry before the logs
    #[arg(short, long)]
    pub status: bool,

    /// Write logs straight to stdout instead of the pager
    #[arg(long)]
    pub no_pager: bool,

    /// Job status refresh in follow mode, in seconds (0 disables it)
    #[arg(long, value_name = "SECS")]
    pub status_interval: Option<u64>,

    /// Give up watching after this many seconds and show the logs
    #[arg(long, value_name = "SECS")]
    pub max_wait: Option<u64>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn display_mode(&self) -> DisplayMode {
        let action = if self.follow {
            Action::Follow
        } else if self.watch {
            Action::Watch
        } else {
            Action::Dump
        };
        DisplayMode::new(action, Streams::from_flags(self.error, self.both))
    }

    /// Follow-mode status refresh; `Some(None)` when turned off on the command line.
    pub fn status_interval(&self) -> Option<Option<Duration>> {
        self.status_interval
            .map(|secs| (secs > 0).then(|| Duration::from_secs(secs)))
    }

    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait.map(Duration::from_secs)
    }
}
