//! Log presentation for slog.
//!
//! The [`Presenter`] turns a resolved job into terminal output: a one-shot
//! dump through a pager, a live follow, or a watch that waits for the job to
//! finish before dumping.

pub mod colorize;
pub mod dump;
pub mod follow;
pub mod mode;
pub mod pager;
pub mod presenter;
pub mod theme;
pub mod watch;

pub use colorize::{Colorizer, LineKind, classify};
pub use mode::{Action, DisplayMode, Streams};
pub use pager::{CommandPager, Pager, PagerError};
pub use presenter::{PresentError, Presenter, PresenterOptions};
pub use theme::Theme;
pub use watch::WatchOutcome;
