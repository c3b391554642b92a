//! Follow mode: live-tail the job's log files.
//!
//! Files are re-read from the last known offset whenever the file watcher
//! reports a change, and on a slow poll tick as well because inotify does
//! not see writes made on other NFS clients. Handles are only held for the
//! duration of a read.

use crate::colorize::Colorizer;
use crate::mode::Streams;
use crate::pager::Pager;
use crate::presenter::{PresentError, Presenter};
use crate::watch::final_state_line;
use camino::{Utf8Path, Utf8PathBuf};
use crossterm::style::Color;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use slog_core::{LogStream, ResolvedLog};
use slog_slurm::{JobActivity, StatusQuerier, StatusQueryError};
use std::fs::{self, File};
use std::future::Future;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};

/// How far back from the end to look for the initial tail lines.
const INITIAL_TAIL_BYTES: u64 = 64 * 1024;

/// Cap on bytes consumed from one file per wake-up.
const MAX_READ_PER_TICK: u64 = 4 * 1024 * 1024;

const ERR_PREFIX: &str = "[ERR] ";

/// One file being followed.
#[derive(Debug)]
struct TailedFile {
    stream: LogStream,
    path: Utf8PathBuf,
    /// Bytes consumed so far.
    offset: u64,
    /// Raw bytes after the last newline. Kept undecoded so a character
    /// split across two reads survives.
    partial: Vec<u8>,
}

impl TailedFile {
    /// Open at the end of the file, returning its last `lines` complete lines.
    fn open(stream: LogStream, path: &Utf8Path, lines: usize) -> io::Result<(Self, Vec<String>)> {
        let mut file = File::open(path)?;
        let len = file.metadata()?.len();
        let start = len.saturating_sub(INITIAL_TAIL_BYTES);
        file.seek(SeekFrom::Start(start))?;
        let mut buf = Vec::new();
        file.take(len - start).read_to_end(&mut buf)?;

        let mut tailed = Self {
            stream,
            path: path.to_path_buf(),
            offset: start + buf.len() as u64,
            partial: buf,
        };
        let mut complete = tailed.take_complete_lines();
        // Reading from the middle of the file cuts the first line.
        if start > 0 && !complete.is_empty() {
            complete.remove(0);
        }
        let skip = complete.len().saturating_sub(lines);
        Ok((tailed, complete.split_off(skip)))
    }

    /// Lines appended since the last read.
    fn read_new(&mut self) -> io::Result<Vec<String>> {
        let len = fs::metadata(&self.path)?.len();
        if len < self.offset {
            tracing::info!(path = %self.path, "log file truncated, reading from start");
            self.offset = 0;
            self.partial.clear();
        }
        if len == self.offset {
            return Ok(Vec::new());
        }

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(self.offset))?;
        let before = self.partial.len();
        file.take(MAX_READ_PER_TICK).read_to_end(&mut self.partial)?;
        self.offset += (self.partial.len() - before) as u64;
        Ok(self.take_complete_lines())
    }

    /// Split off and decode every newline-terminated line in `partial`.
    fn take_complete_lines(&mut self) -> Vec<String> {
        let Some(last_newline) = self.partial.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };
        let rest = self.partial.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.partial, rest);
        String::from_utf8_lossy(&complete)
            .lines()
            .map(|l| l.trim_end_matches('\r').to_string())
            .collect()
    }

    /// The unterminated tail, decoded, if there is one.
    fn take_partial(&mut self) -> Option<String> {
        if self.partial.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.partial);
        Some(String::from_utf8_lossy(&rest).trim_end_matches('\r').to_string())
    }
}

/// Start a watcher that pings the returned channel on any change.
///
/// Returns no watcher when the platform backend cannot be created; the
/// channel is then closed and follow relies on the poll tick alone.
fn watch_files(files: &[TailedFile]) -> (Option<RecommendedWatcher>, mpsc::UnboundedReceiver<()>) {
    let (tx, rx) = mpsc::unbounded_channel();

    let watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    let _ = tx.send(());
                }
            }
            Err(e) => tracing::debug!(error = %e, "file watcher error"),
        },
        Config::default(),
    );

    let mut watcher = match watcher {
        Ok(w) => w,
        Err(e) => {
            tracing::warn!(error = %e, "file watcher unavailable, falling back to polling");
            return (None, rx);
        }
    };
    for file in files {
        if let Err(e) = watcher.watch(file.path.as_std_path(), RecursiveMode::NonRecursive) {
            tracing::debug!(path = %file.path, error = %e, "could not watch log file");
        }
    }
    (Some(watcher), rx)
}

/// Resolve the in-flight status query, if any.
async fn poll_in_flight<F: Future>(slot: Pin<&mut Option<F>>) -> Option<F::Output> {
    match slot.as_pin_mut() {
        Some(query) => Some(query.await),
        None => None,
    }
}

impl<P: Pager, Q: StatusQuerier, W: Write> Presenter<P, Q, W> {
    pub(crate) async fn follow(
        &mut self,
        resolved: &ResolvedLog,
        streams: Streams,
        mut shutdown: Pin<&mut impl Future<Output = ()>>,
    ) -> Result<(), PresentError> {
        let mut files = Vec::new();
        let mut initial = Vec::new();
        for &stream in streams.selected() {
            if let Some(path) = resolved.existing(stream) {
                let (file, lines) = TailedFile::open(stream, path, self.options.tail_lines)?;
                initial.push((stream, lines));
                files.push(file);
            }
        }
        if files.is_empty() {
            return Err(PresentError::NothingToFollow {
                job_id: resolved.job_id.clone(),
            });
        }

        let options = &self.options;
        let querier = &self.querier;
        let mut sink = FollowSink {
            out: &mut self.out,
            colors: &self.colors,
            prefix_errors: files.len() > 1,
        };
        sink.banner(&files)?;
        for (stream, lines) in &initial {
            sink.write_lines(*stream, lines)?;
        }
        sink.out.flush()?;

        let (_watcher, mut changes) = watch_files(&files);

        let mut poll = interval(options.follow_poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let job_id = resolved.job_id.as_str();
        let mut monitor_status = options.status_interval.is_some();
        let mut status = interval(options.status_interval.unwrap_or(Duration::from_secs(3600)));
        status.set_missed_tick_behavior(MissedTickBehavior::Skip);
        status.reset();
        let mut last_status: Option<String> = None;

        // A slow squeue must not hold up the tail, so the query is its own branch.
        let in_flight = monitor_status.then(|| querier.query(job_id));
        tokio::pin!(in_flight);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                Some(()) = changes.recv() => {
                    while changes.try_recv().is_ok() {}
                    sink.drain(&mut files)?;
                }
                _ = poll.tick() => sink.drain(&mut files)?,
                _ = status.tick(), if monitor_status && in_flight.is_none() => {
                    in_flight.set(Some(querier.query(job_id)));
                }
                Some(result) = poll_in_flight(in_flight.as_mut()), if in_flight.is_some() => {
                    in_flight.set(None);
                    monitor_status = sink.report_status(job_id, result, &mut last_status)?;
                }
            }
        }

        for file in &mut files {
            if let Some(line) = file.take_partial() {
                sink.write_lines(file.stream, &[line])?;
            }
        }
        writeln!(sink.out)?;
        let warning = sink.colors.theme().warning;
        sink.notice("Stopped following logs", warning)?;
        Ok(())
    }
}

/// Output side of follow mode. Holds only the writer and colors so the
/// status query can borrow the querier at the same time.
struct FollowSink<'a, W> {
    out: &'a mut W,
    colors: &'a Colorizer,
    prefix_errors: bool,
}

impl<W: Write> FollowSink<'_, W> {
    fn notice(&mut self, text: &str, color: Color) -> io::Result<()> {
        writeln!(self.out, "{}", self.colors.paint(text, color))?;
        self.out.flush()
    }

    fn banner(&mut self, files: &[TailedFile]) -> io::Result<()> {
        let theme = self.colors.theme();
        let (warning, highlight) = (theme.warning, theme.highlight);
        if self.prefix_errors {
            self.notice(
                "Following both output and error logs in real-time... (Ctrl+C to stop)",
                warning,
            )?;
            self.notice(&format!("Error lines are prefixed with {ERR_PREFIX}"), highlight)?;
        } else {
            let stream = files.first().map(|f| f.stream).unwrap_or(LogStream::Out);
            self.notice(&format!("Following {stream} log... (Ctrl+C to stop)"), warning)?;
        }
        Ok(())
    }

    /// Emit whatever was appended to each file since the last read.
    fn drain(&mut self, files: &mut [TailedFile]) -> io::Result<()> {
        for file in files.iter_mut() {
            match file.read_new() {
                Ok(lines) => self.write_lines(file.stream, &lines)?,
                Err(e) => tracing::debug!(path = %file.path, error = %e, "log file not readable"),
            }
        }
        self.out.flush()
    }

    fn write_lines(&mut self, stream: LogStream, lines: &[String]) -> io::Result<()> {
        let prefix = if self.prefix_errors && stream == LogStream::Err {
            self.colors.paint(ERR_PREFIX, self.colors.theme().error)
        } else {
            "".into()
        };
        for line in lines {
            writeln!(self.out, "{}{}", prefix, self.colors.line(line))?;
        }
        Ok(())
    }

    /// Print job status changes. Returns whether monitoring should go on.
    fn report_status(
        &mut self,
        job_id: &str,
        result: Result<JobActivity, StatusQueryError>,
        last_status: &mut Option<String>,
    ) -> io::Result<bool> {
        let theme = self.colors.theme();
        let (highlight, success, warning) = (theme.highlight, theme.success, theme.warning);

        match result {
            Ok(JobActivity::Active(entry)) => {
                let summary = entry.summary(job_id);
                if last_status.as_deref() != Some(summary.as_str()) {
                    let line = self.colors.paint_bold(&format!("[{summary}]"), highlight).into_owned();
                    writeln!(self.out, "{line}")?;
                    self.out.flush()?;
                    *last_status = Some(summary);
                }
                Ok(true)
            }
            Ok(JobActivity::Finished(final_state)) => {
                let rule = "=".repeat(80);
                writeln!(self.out)?;
                self.notice(&rule, highlight)?;
                let done = self.colors.paint_bold(&format!("Job {job_id} completed!"), success).into_owned();
                writeln!(self.out, "{done}")?;
                match final_state {
                    Some(state) => writeln!(self.out, "{}", final_state_line(self.colors, &state))?,
                    None => self.notice("Status: Job no longer in queue (sacct not available)", warning)?,
                }
                self.notice(&rule, highlight)?;
                Ok(false)
            }
            Err(e) => {
                tracing::warn!(job_id, error = %e, "job status unavailable, following without status updates");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{Action, DisplayMode};
    use crate::presenter::PresenterOptions;
    use crate::presenter::testing::{HangingQuerier, RecordingPager, ScriptedQuerier};
    use slog_config::LogDirs;
    use slog_slurm::{FinalState, QueueEntry, SlurmJobState};
    use std::fs::OpenOptions;
    use tempfile::TempDir;
    use tokio::time::sleep;

    fn append(path: &Utf8Path, text: &str) {
        let mut file = OpenOptions::new().append(true).open(path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    fn tailed(temp: &TempDir, content: &[u8]) -> TailedFile {
        let path = Utf8Path::from_path(temp.path()).unwrap().join("job-1.out");
        fs::write(&path, content).unwrap();
        TailedFile::open(LogStream::Out, &path, 10).unwrap().0
    }

    #[test]
    fn test_open_returns_last_lines() {
        let temp = TempDir::new().unwrap();
        let path = Utf8Path::from_path(temp.path()).unwrap().join("job-1.out");
        let content: String = (1..=20).map(|i| format!("line {i}\n")).collect();
        fs::write(&path, &content).unwrap();

        let (file, lines) = TailedFile::open(LogStream::Out, &path, 3).unwrap();
        assert_eq!(lines, vec!["line 18", "line 19", "line 20"]);
        assert_eq!(file.offset, content.len() as u64);
    }

    #[test]
    fn test_open_holds_back_partial_line() {
        let temp = TempDir::new().unwrap();
        let mut file = tailed(&temp, b"done\nhalf");
        assert_eq!(file.partial, b"half");

        append(&file.path.clone(), " way\nnext");
        assert_eq!(file.read_new().unwrap(), vec!["half way"]);
        assert_eq!(file.partial, b"next");
    }

    #[test]
    fn test_open_large_file_drops_cut_line() {
        let temp = TempDir::new().unwrap();
        let path = Utf8Path::from_path(temp.path()).unwrap().join("big-1.out");
        let line = "x".repeat(99);
        let content: String = (0..2000).map(|_| format!("{line}\n")).collect();
        fs::write(&path, &content).unwrap();

        let (_, lines) = TailedFile::open(LogStream::Out, &path, 5000).unwrap();
        assert!(lines.iter().all(|l| l.len() == 99));
        assert!(lines.len() < 2000);
    }

    #[test]
    fn test_read_new_and_truncation() {
        let temp = TempDir::new().unwrap();
        let mut file = tailed(&temp, b"a\n");
        assert!(file.read_new().unwrap().is_empty());

        append(&file.path.clone(), "b\r\nc\n");
        assert_eq!(file.read_new().unwrap(), vec!["b", "c"]);

        fs::write(&file.path, "new\n").unwrap();
        assert_eq!(file.read_new().unwrap(), vec!["new"]);
    }

    #[test]
    fn test_read_new_keeps_character_split_across_reads() {
        let temp = TempDir::new().unwrap();
        let mut file = tailed(&temp, b"");
        let line = "h\u{e9}llo\n".as_bytes();

        // Stop in the middle of the two-byte `\u{e9}`.
        OpenOptions::new()
            .append(true)
            .open(&file.path)
            .unwrap()
            .write_all(&line[..2])
            .unwrap();
        assert!(file.read_new().unwrap().is_empty());

        OpenOptions::new()
            .append(true)
            .open(&file.path)
            .unwrap()
            .write_all(&line[2..])
            .unwrap();
        assert_eq!(file.read_new().unwrap(), vec!["h\u{e9}llo"]);
    }

    #[test]
    fn test_take_partial_decodes_unterminated_tail() {
        let temp = TempDir::new().unwrap();
        let mut file = tailed(&temp, "a\nb\u{e9}".as_bytes());
        assert_eq!(file.take_partial().as_deref(), Some("b\u{e9}"));
        assert_eq!(file.take_partial(), None);
    }

    fn setup<Q: StatusQuerier>(
        streams: &[(LogStream, &str)],
        querier: Q,
        status_interval: Option<Duration>,
    ) -> (TempDir, ResolvedLog, Presenter<RecordingPager, Q, Vec<u8>>) {
        let temp = TempDir::new().unwrap();
        let root = Utf8Path::from_path(temp.path()).unwrap();
        let dirs = LogDirs {
            out_dir: root.to_path_buf(),
            err_dir: root.to_path_buf(),
        };
        let resolved = ResolvedLog::for_job(&dirs, "sim", "42");
        for (stream, content) in streams {
            fs::write(resolved.path(*stream), content).unwrap();
        }
        let options = PresenterOptions {
            status_interval,
            follow_poll_interval: Duration::from_millis(10),
            ..PresenterOptions::default()
        };
        let presenter = Presenter::new(
            Colorizer::disabled(),
            RecordingPager::default(),
            querier,
            options,
            Vec::new(),
        );
        (temp, resolved, presenter)
    }

    #[tokio::test]
    async fn test_follow_streams_new_lines_until_interrupted() {
        let (_temp, resolved, mut p) = setup(
            &[(LogStream::Out, "old 1\nold 2\n"), (LogStream::Err, "warn 1\n")],
            ScriptedQuerier::new(vec![]),
            None,
        );
        let out = resolved.out.clone();
        let err = resolved.err.clone();
        let shutdown = async move {
            sleep(Duration::from_millis(50)).await;
            append(&out, "new out\n");
            append(&err, "new err\n");
            sleep(Duration::from_millis(300)).await;
        };

        p.present(&resolved, DisplayMode::new(Action::Follow, Streams::Both), shutdown)
            .await
            .unwrap();

        let printed = String::from_utf8(p.into_inner()).unwrap();
        assert!(printed.contains("Following both output and error logs"));
        assert!(printed.contains("old 1\nold 2\n[ERR] warn 1\n"));
        assert!(printed.contains("\nnew out\n"));
        assert!(printed.contains("\n[ERR] new err\n"));
        assert!(printed.ends_with("Stopped following logs\n"));
    }

    #[tokio::test]
    async fn test_follow_single_stream_has_no_prefix() {
        let (_temp, resolved, mut p) = setup(
            &[(LogStream::Err, "boom\n")],
            ScriptedQuerier::new(vec![]),
            None,
        );

        p.present(
            &resolved,
            DisplayMode::new(Action::Follow, Streams::Err),
            sleep(Duration::from_millis(30)),
        )
        .await
        .unwrap();

        let printed = String::from_utf8(p.into_inner()).unwrap();
        assert!(printed.contains("Following error log..."));
        assert!(printed.contains("\nboom\n"));
        assert!(!printed.contains("[ERR]"));
    }

    #[tokio::test]
    async fn test_follow_without_files_fails() {
        let (_temp, resolved, mut p) = setup(&[], ScriptedQuerier::new(vec![]), None);

        let err = p
            .present(
                &resolved,
                DisplayMode::new(Action::Follow, Streams::Both),
                std::future::pending(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PresentError::NothingToFollow { .. }));
    }

    #[tokio::test]
    async fn test_follow_reports_status_and_completion() {
        let querier = ScriptedQuerier::new(vec![
            Ok(JobActivity::Active(QueueEntry {
                state: SlurmJobState::Running,
                runtime: Some("0:01".to_string()),
                reason: Some("node1".to_string()),
            })),
            Ok(JobActivity::Finished(Some(FinalState {
                state: SlurmJobState::Failed {
                    exit_code: 3,
                    error: String::new(),
                },
                exit_code: "3:0".to_string(),
            }))),
        ]);
        let (_temp, resolved, mut p) = setup(
            &[(LogStream::Out, "start\n")],
            querier,
            Some(Duration::from_millis(20)),
        );

        p.present(
            &resolved,
            DisplayMode::new(Action::Follow, Streams::Out),
            sleep(Duration::from_millis(200)),
        )
        .await
        .unwrap();

        assert_eq!(*p.querier.calls.borrow(), 2);
        let printed = String::from_utf8(p.into_inner()).unwrap();
        assert!(printed.contains("[Job 42: RUNNING - Runtime: 0:01 - node1]"));
        assert!(printed.contains("Job 42 completed!"));
        assert!(printed.contains("Status: FAILED - Exit code: 3:0"));
        // Following continues after the job finishes.
        assert!(printed.ends_with("Stopped following logs\n"));
    }

    #[tokio::test]
    async fn test_follow_keeps_tailing_while_status_query_hangs() {
        let (_temp, resolved, mut p) = setup(
            &[(LogStream::Out, "start\n")],
            HangingQuerier,
            Some(Duration::from_millis(10)),
        );
        let out = resolved.out.clone();
        let shutdown = async move {
            sleep(Duration::from_millis(100)).await;
            append(&out, "new line\n");
            sleep(Duration::from_millis(200)).await;
        };

        let run = p.present(&resolved, DisplayMode::new(Action::Follow, Streams::Out), shutdown);
        tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .expect("follow stopped on shutdown")
            .unwrap();

        let printed = String::from_utf8(p.into_inner()).unwrap();
        assert!(printed.contains("\nnew line\n"));
        assert!(printed.ends_with("Stopped following logs\n"));
    }

    #[tokio::test]
    async fn test_follow_status_error_stops_monitoring_only() {
        let (_temp, resolved, mut p) = setup(
            &[(LogStream::Out, "start\n")],
            ScriptedQuerier::new(vec![Err("squeue down".to_string())]),
            Some(Duration::from_millis(10)),
        );
        let out = resolved.out.clone();
        let shutdown = async move {
            sleep(Duration::from_millis(60)).await;
            append(&out, "after error\n");
            sleep(Duration::from_millis(200)).await;
        };

        p.present(&resolved, DisplayMode::new(Action::Follow, Streams::Out), shutdown)
            .await
            .unwrap();

        // One failed query and no retries.
        assert_eq!(*p.querier.calls.borrow(), 1);
        let printed = String::from_utf8(p.into_inner()).unwrap();
        assert!(!printed.contains("[Job 42"));
        assert!(!printed.contains("completed!"));
        assert!(printed.contains("\nafter error\n"));
        assert!(printed.ends_with("Stopped following logs\n"));
    }
}
