//! Per-line log colorization.

use crate::theme::Theme;
use crossterm::style::{Color, Stylize};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[?(\d{4}-\d{2}-\d{2}|\d{2}:\d{2}:\d{2})").unwrap());
static ERROR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)error|fail").unwrap());
static WARNING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)warn").unwrap());

/// What a log line looks like, in rule priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Timestamp,
    Error,
    Warning,
}

/// Classify a line. The first matching rule wins.
pub fn classify(line: &str) -> Option<LineKind> {
    if TIMESTAMP.is_match(line) {
        Some(LineKind::Timestamp)
    } else if ERROR.is_match(line) {
        Some(LineKind::Error)
    } else if WARNING.is_match(line) {
        Some(LineKind::Warning)
    } else {
        None
    }
}

/// Lines that already carry ANSI escapes are passed through untouched.
fn has_escapes(line: &str) -> bool {
    line.contains('\x1b')
}

/// Applies the theme to text, or does nothing when color is off.
pub struct Colorizer {
    enabled: bool,
    theme: Theme,
}

impl Colorizer {
    pub fn new(enabled: bool, theme: Theme) -> Self {
        Self { enabled, theme }
    }

    pub fn disabled() -> Self {
        Self::new(false, Theme::default())
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Wrap `text` in `color`.
    pub fn paint<'a>(&self, text: &'a str, color: Color) -> Cow<'a, str> {
        if !self.enabled {
            return Cow::Borrowed(text);
        }
        Cow::Owned(text.with(color).to_string())
    }

    /// Wrap `text` in bold `color`.
    pub fn paint_bold<'a>(&self, text: &'a str, color: Color) -> Cow<'a, str> {
        if !self.enabled {
            return Cow::Borrowed(text);
        }
        Cow::Owned(text.with(color).bold().to_string())
    }

    /// Colorize one physical log line according to its kind.
    pub fn line<'a>(&self, line: &'a str) -> Cow<'a, str> {
        if !self.enabled || has_escapes(line) {
            return Cow::Borrowed(line);
        }
        match classify(line) {
            Some(LineKind::Timestamp) => self.paint(line, self.theme.timestamp),
            Some(LineKind::Error) => self.paint(line, self.theme.error),
            Some(LineKind::Warning) => self.paint(line, self.theme.warning),
            None => Cow::Borrowed(line),
        }
    }
}
