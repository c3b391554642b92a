//! SLURM integration for slog.
//!
//! Query a single job's status via squeue and its final state via sacct.

pub mod sacct;
pub mod squeue;
pub mod status;
pub mod types;

pub use sacct::{SacctError, query_final_state};
pub use squeue::{SqueueError, query_squeue_job, query_squeue_table};
pub use status::{JobActivity, SlurmStatusQuerier, StatusQuerier, StatusQueryError};
pub use types::{FinalState, Outcome, QueueEntry, SlurmJobState};
