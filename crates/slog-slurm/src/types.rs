//! SLURM job types.

use std::fmt;

/// SLURM job status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlurmJobState {
    Pending,
    Running,
    Completing,
    Suspended,
    Completed { exit_code: i32 },
    Failed { exit_code: i32, error: String },
    Cancelled,
    Timeout,
    OutOfMemory,
    Unknown(String),
}

impl SlurmJobState {
    /// True once SLURM will not run the job any further.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. }
                | Self::Failed { .. }
                | Self::Cancelled
                | Self::Timeout
                | Self::OutOfMemory
        )
    }

    /// Upper-case SLURM name for display.
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Completing => "COMPLETING",
            Self::Suspended => "SUSPENDED",
            Self::Completed { .. } => "COMPLETED",
            Self::Failed { .. } => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Timeout => "TIMEOUT",
            Self::OutOfMemory => "OUT_OF_MEMORY",
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for SlurmJobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One job's row in `squeue` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    /// Job state
    pub state: SlurmJobState,

    /// Elapsed runtime as printed by squeue (e.g. "1:02:03")
    pub runtime: Option<String>,

    /// Pending reason or node list
    pub reason: Option<String>,
}

impl QueueEntry {
    /// One-line summary: `Job 42: RUNNING - Runtime: 1:02 - node01`.
    pub fn summary(&self, job_id: &str) -> String {
        let mut line = format!(
            "Job {}: {} - Runtime: {}",
            job_id,
            self.state,
            self.runtime.as_deref().unwrap_or("0:00")
        );
        if let Some(reason) = &self.reason {
            line.push_str(" - ");
            line.push_str(reason);
        }
        line
    }
}

/// How a finished job ended, coarse enough to pick a banner color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Other,
}

/// Final job state from `sacct`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalState {
    /// Parsed state
    pub state: SlurmJobState,

    /// Raw ExitCode field (exit_code:signal)
    pub exit_code: String,
}

impl FinalState {
    pub fn outcome(&self) -> Outcome {
        let clean_exit = self.exit_code == "0:0";
        match self.state {
            SlurmJobState::Completed { .. } if clean_exit => Outcome::Success,
            SlurmJobState::Failed { .. } => Outcome::Failure,
            _ if !self.exit_code.starts_with("0:") => Outcome::Failure,
            _ => Outcome::Other,
        }
    }

    /// Human-readable status line for the completion banner.
    pub fn describe(&self) -> String {
        match self.outcome() {
            Outcome::Success => format!("Status: {} (Success)", self.state),
            _ => format!("Status: {} - Exit code: {}", self.state, self.exit_code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!SlurmJobState::Pending.is_terminal());
        assert!(!SlurmJobState::Running.is_terminal());
        assert!(!SlurmJobState::Completing.is_terminal());
        assert!(SlurmJobState::Completed { exit_code: 0 }.is_terminal());
        assert!(SlurmJobState::Timeout.is_terminal());
    }

    #[test]
    fn test_queue_entry_summary() {
        let entry = QueueEntry {
            state: SlurmJobState::Running,
            runtime: Some("5:01".to_string()),
            reason: Some("node07".to_string()),
        };
        assert_eq!(entry.summary("9560"), "Job 9560: RUNNING - Runtime: 5:01 - node07");

        let pending = QueueEntry {
            state: SlurmJobState::Pending,
            runtime: None,
            reason: None,
        };
        assert_eq!(pending.summary("1"), "Job 1: PENDING - Runtime: 0:00");
    }

    #[test]
    fn test_final_state_outcome() {
        let ok = FinalState {
            state: SlurmJobState::Completed { exit_code: 0 },
            exit_code: "0:0".to_string(),
        };
        assert_eq!(ok.outcome(), Outcome::Success);
        assert_eq!(ok.describe(), "Status: COMPLETED (Success)");

        let failed = FinalState {
            state: SlurmJobState::Failed {
                exit_code: 2,
                error: String::new(),
            },
            exit_code: "2:0".to_string(),
        };
        assert_eq!(failed.outcome(), Outcome::Failure);
        assert_eq!(failed.describe(), "Status: FAILED - Exit code: 2:0");

        let cancelled = FinalState {
            state: SlurmJobState::Cancelled,
            exit_code: "0:15".to_string(),
        };
        assert_eq!(cancelled.outcome(), Outcome::Other);
    }
}
