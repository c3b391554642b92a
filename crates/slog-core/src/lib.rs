//! Job log resolution for slog.
//!
//! Maps a job token (ID, name, or `name-ID`) onto the SLURM log files in the
//! configured output and error directories.

pub mod filename;
pub mod recent;
pub mod resolve;
pub mod token;

pub use filename::{LogFileName, LogStream};
pub use recent::{RecentLog, recent_logs};
pub use resolve::{ResolveError, ResolvedLog, latest, resolve};
pub use token::{JobToken, TokenError};
