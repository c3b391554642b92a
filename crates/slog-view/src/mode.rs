//! Display modes.

use slog_core::LogStream;

/// What to do with the resolved logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Show the whole log once, through the pager
    #[default]
    Dump,
    /// Live-tail until interrupted
    Follow,
    /// Wait for the job to finish, then dump
    Watch,
}

/// Which log streams to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Streams {
    #[default]
    Out,
    Err,
    Both,
}

impl Streams {
    /// `-e` alone selects stderr, `-b` (with or without `-e`) both.
    pub fn from_flags(error: bool, both: bool) -> Self {
        match (error, both) {
            (_, true) => Self::Both,
            (true, false) => Self::Err,
            (false, false) => Self::Out,
        }
    }

    pub fn selected(self) -> &'static [LogStream] {
        match self {
            Self::Out => &[LogStream::Out],
            Self::Err => &[LogStream::Err],
            Self::Both => &[LogStream::Out, LogStream::Err],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayMode {
    pub action: Action,
    pub streams: Streams,
}

impl DisplayMode {
    pub fn new(action: Action, streams: Streams) -> Self {
        Self { action, streams }
    }
}
