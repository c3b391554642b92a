//! Job status capability used by watch and follow modes.

use crate::sacct::{SacctError, query_final_state};
use crate::squeue::{SqueueError, query_squeue_job};
use crate::types::{FinalState, QueueEntry};
use thiserror::Error;

/// Failure to learn anything about the job from the scheduler.
#[derive(Error, Debug)]
pub enum StatusQueryError {
    #[error("squeue query failed: {0}")]
    Squeue(#[from] SqueueError),
}

/// Where a job is in its lifecycle, as far as the scheduler can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobActivity {
    /// Still queued, running or completing.
    Active(QueueEntry),
    /// Left the queue; final state when accounting knows it.
    Finished(Option<FinalState>),
}

/// Something that can report whether a job is still active.
#[allow(async_fn_in_trait)]
pub trait StatusQuerier {
    async fn query(&self, job_id: &str) -> Result<JobActivity, StatusQueryError>;
}

/// `squeue` for liveness, `sacct` for the final state.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlurmStatusQuerier;

impl StatusQuerier for SlurmStatusQuerier {
    async fn query(&self, job_id: &str) -> Result<JobActivity, StatusQueryError> {
        if let Some(entry) = query_squeue_job(job_id).await?
            && !entry.state.is_terminal()
        {
            return Ok(JobActivity::Active(entry));
        }

        // Accounting is optional, a job can finish without a known final state.
        let final_state = match query_final_state(job_id).await {
            Ok(state) => state,
            Err(SacctError::Command(e)) if e.is_missing_program() => {
                tracing::debug!(job_id, "sacct not installed");
                None
            }
            Err(e) => {
                tracing::warn!(job_id, error = %e, "could not read final job state");
                None
            }
        };
        Ok(JobActivity::Finished(final_state))
    }
}
