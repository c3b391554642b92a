//! Final state of a job that has left the queue, from accounting.

use crate::squeue::parse_state as parse_queue_state;
use crate::types::{FinalState, SlurmJobState};
use slog_parsers::{CommandError, parse_exit_code, run_command, split_delimited};
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum SacctError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("Failed to parse sacct output: {0}")]
    ParseError(String),
}

/// Allocation-level state and `exit:signal`, `|`-separated with `-P`.
const SACCT_FORMAT: &str = "State,ExitCode";

/// Attach the exit code to an accounting state.
fn parse_state(state: &str, exit: &str) -> SlurmJobState {
    let exit_code = parse_exit_code(exit);
    // e.g. "CANCELLED by 12345"
    let base = state.split_whitespace().next().unwrap_or_default();

    match parse_queue_state(base) {
        SlurmJobState::Completed { .. } => SlurmJobState::Completed { exit_code },
        SlurmJobState::Failed { .. } => SlurmJobState::Failed {
            exit_code,
            error: format!("Exit code: {exit_code}"),
        },
        SlurmJobState::Unknown(raw) if raw == "NODE_FAIL" => SlurmJobState::Failed {
            exit_code: -1,
            error: "Node failure".to_string(),
        },
        other => other,
    }
}

fn parse_sacct_line(line: &str) -> Result<FinalState, SacctError> {
    let fields = split_delimited(line, 2).map_err(SacctError::ParseError)?;
    let exit = fields[1].trim();
    Ok(FinalState {
        state: parse_state(fields[0], exit),
        exit_code: exit.to_string(),
    })
}

/// `sacct -j <id> -n -X -P -o State,ExitCode`
///
/// `None` when accounting has no record of the job yet.
pub async fn query_final_state(job_id: &str) -> Result<Option<FinalState>, SacctError> {
    let mut cmd = Command::new("sacct");
    cmd.args(["-j", job_id, "-n", "-X", "-P", "-o", SACCT_FORMAT]);
    let stdout = run_command(&mut cmd, "sacct").await?;

    stdout
        .lines()
        .find(|l| !l.trim().is_empty())
        .map(parse_sacct_line)
        .transpose()
}
