//! `slog --status`: the squeue table printed ahead of the logs.

use slog_slurm::query_squeue_table;
use slog_view::Colorizer;
use std::io::{self, Write};

/// The job's squeue table, or `None` when it is not queued or squeue fails.
pub async fn fetch_table(job_id: &str) -> Option<String> {
    query_squeue_table(job_id).await.unwrap_or_else(|e| {
        tracing::warn!(job_id, error = %e, "squeue failed");
        None
    })
}

pub fn write_status(
    out: &mut impl Write,
    job_id: &str,
    table: Option<&str>,
    colors: &Colorizer,
) -> io::Result<()> {
    let theme = colors.theme();
    writeln!(out, "{}", colors.paint_bold("=== JOB STATUS ===", theme.highlight))?;

    match table {
        Some(table) => writeln!(out, "{}", table.trim_end())?,
        None => {
            let text = format!("Job {job_id} not in queue (completed or doesn't exist)");
            writeln!(out, "{}", colors.paint(&text, theme.warning))?;
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", colors.paint_bold("=== LOGS ===", theme.highlight))?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(table: Option<&str>) -> String {
        let mut out = Vec::new();
        write_status(&mut out, "42", table, &Colorizer::disabled()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_status_with_queue_table() {
        let table = "JOBID PARTITION NAME ST\n   42    normal  sim  R\n\n";
        assert_eq!(
            render(Some(table)),
            "=== JOB STATUS ===\nJOBID PARTITION NAME ST\n   42    normal  sim  R\n\n=== LOGS ===\n"
        );
    }

    #[test]
    fn test_status_for_job_not_in_queue() {
        assert_eq!(
            render(None),
            "=== JOB STATUS ===\nJob 42 not in queue (completed or doesn't exist)\n\n=== LOGS ===\n"
        );
    }
}
