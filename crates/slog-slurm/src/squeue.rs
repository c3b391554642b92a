//! Query a queued SLURM job via squeue.

use crate::types::{QueueEntry, SlurmJobState};
use slog_parsers::{CommandError, non_empty_string, run_command, split_delimited};
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum SqueueError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("Failed to parse squeue output: {0}")]
    ParseError(String),
}

/// squeue output format:
/// %T - State (extended)
/// %M - Time used
/// %R - Reason (pending) or node list (running)
const SQUEUE_FORMAT: &str = "%T|%M|%R";

/// Parse SLURM state string.
pub(crate) fn parse_state(s: &str) -> SlurmJobState {
    match s.trim().to_uppercase().as_str() {
        "PENDING" | "PD" => SlurmJobState::Pending,
        "RUNNING" | "R" => SlurmJobState::Running,
        "COMPLETING" | "CG" => SlurmJobState::Completing,
        "SUSPENDED" | "S" => SlurmJobState::Suspended,
        "COMPLETED" | "CD" => SlurmJobState::Completed { exit_code: 0 },
        "FAILED" | "F" => SlurmJobState::Failed {
            exit_code: 1,
            error: String::new(),
        },
        "CANCELLED" | "CA" => SlurmJobState::Cancelled,
        "TIMEOUT" | "TO" => SlurmJobState::Timeout,
        "OUT_OF_MEMORY" | "OOM" => SlurmJobState::OutOfMemory,
        other => SlurmJobState::Unknown(other.to_string()),
    }
}

/// Parse a single line of squeue output.
fn parse_squeue_line(line: &str) -> Result<QueueEntry, SqueueError> {
    let fields = split_delimited(line, 3).map_err(SqueueError::ParseError)?;

    Ok(QueueEntry {
        state: parse_state(fields[0]),
        runtime: non_empty_string(fields[1]),
        reason: non_empty_string(fields[2]),
    })
}

/// squeue reports jobs that have aged out of the controller this way.
fn is_unknown_job(err: &CommandError) -> bool {
    err.stderr().is_some_and(|stderr| stderr.contains("Invalid job id"))
}

/// Query one job with squeue.
///
/// Returns `None` once the job is no longer in the queue.
pub async fn query_squeue_job(job_id: &str) -> Result<Option<QueueEntry>, SqueueError> {
    let mut cmd = Command::new("squeue");
    cmd.args(["-j", job_id, "-h", "-o", SQUEUE_FORMAT]);

    let stdout = match run_command(&mut cmd, "squeue").await {
        Ok(stdout) => stdout,
        Err(e) if is_unknown_job(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    match stdout.lines().find(|l| !l.trim().is_empty()) {
        Some(line) => parse_squeue_line(line).map(Some),
        None => Ok(None),
    }
}

/// Raw `squeue -j <id>` table for display, `None` when the job is gone.
pub async fn query_squeue_table(job_id: &str) -> Result<Option<String>, SqueueError> {
    let mut cmd = Command::new("squeue");
    cmd.args(["-j", job_id]);

    let stdout = match run_command(&mut cmd, "squeue").await {
        Ok(stdout) => stdout,
        Err(e) if is_unknown_job(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    // Header only means the job is not queued.
    if stdout.lines().filter(|l| !l.trim().is_empty()).count() <= 1 {
        return Ok(None);
    }
    Ok(Some(stdout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state() {
        assert_eq!(parse_state("RUNNING"), SlurmJobState::Running);
        assert_eq!(parse_state("R"), SlurmJobState::Running);
        assert_eq!(parse_state("PENDING"), SlurmJobState::Pending);
        assert_eq!(parse_state("PD"), SlurmJobState::Pending);
        assert_eq!(parse_state("CG"), SlurmJobState::Completing);
        assert_eq!(
            parse_state("COMPLETED"),
            SlurmJobState::Completed { exit_code: 0 }
        );
        assert_eq!(
            parse_state("PREEMPTED"),
            SlurmJobState::Unknown("PREEMPTED".to_string())
        );
    }

    #[test]
    fn test_parse_squeue_line_running() {
        let entry = parse_squeue_line("RUNNING|1:02:03|node01").unwrap();
        assert_eq!(entry.state, SlurmJobState::Running);
        assert_eq!(entry.runtime.as_deref(), Some("1:02:03"));
        assert_eq!(entry.reason.as_deref(), Some("node01"));
    }

    #[test]
    fn test_parse_squeue_line_pending() {
        let entry = parse_squeue_line("PENDING|0:00|(None)").unwrap();
        assert_eq!(entry.state, SlurmJobState::Pending);
        assert_eq!(entry.reason, None);

        let entry = parse_squeue_line("PENDING|0:00|(Priority)").unwrap();
        assert_eq!(entry.reason.as_deref(), Some("(Priority)"));
    }

    #[test]
    fn test_parse_squeue_line_reason_with_pipe() {
        let entry = parse_squeue_line("RUNNING|0:10|odd|node").unwrap();
        assert_eq!(entry.reason.as_deref(), Some("odd|node"));
    }

    #[test]
    fn test_parse_squeue_line_short() {
        assert!(matches!(
            parse_squeue_line("RUNNING"),
            Err(SqueueError::ParseError(_))
        ));
    }

    #[test]
    fn test_unknown_job_detection() {
        let gone = CommandError::Failed {
            command: "squeue".to_string(),
            stderr: "slurm_load_jobs error: Invalid job id specified".to_string(),
        };
        assert!(is_unknown_job(&gone));

        let other = CommandError::Failed {
            command: "squeue".to_string(),
            stderr: "Unable to contact slurm controller".to_string(),
        };
        assert!(!is_unknown_job(&other));
    }
}
