//! Dump mode: the whole log at once, through the pager when possible.

use crate::colorize::Colorizer;
use crate::mode::Streams;
use crate::pager::{Pager, PagerError};
use crate::presenter::{PresentError, Presenter};
use slog_core::{LogStream, ResolvedLog};
use slog_slurm::StatusQuerier;
use std::fmt::Write as _;
use std::fs;
use std::future::Future;
use std::io::Write;
use std::pin::Pin;

impl<P: Pager, Q: StatusQuerier, W: Write> Presenter<P, Q, W> {
    pub(crate) async fn dump(
        &mut self,
        resolved: &ResolvedLog,
        streams: Streams,
        mut shutdown: Pin<&mut impl Future<Output = ()>>,
    ) -> Result<(), PresentError> {
        let document = compose(resolved, streams, &self.colors);

        if self.options.use_pager {
            self.out.flush()?;
            tokio::select! {
                res = self.pager.page(&document) => match res {
                    Ok(()) => return Ok(()),
                    Err(e @ PagerError::Unavailable { .. }) => {
                        tracing::warn!(error = %e, "pager unavailable, writing logs directly");
                    }
                    Err(e) => return Err(e.into()),
                },
                _ = &mut shutdown => return Ok(()),
            }
        }

        self.out.write_all(document.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Build the dump document: a header and the colorized content per stream.
pub fn compose(resolved: &ResolvedLog, streams: Streams, colors: &Colorizer) -> String {
    let theme = colors.theme();
    let mut doc = String::new();

    for (i, &stream) in streams.selected().iter().enumerate() {
        if i > 0 {
            doc.push('\n');
        }
        let path = resolved.path(stream);
        let (label, color) = match stream {
            LogStream::Out => ("OUTPUT", theme.success),
            LogStream::Err => ("ERROR", theme.error),
        };

        if !path.is_file() {
            let missing = match stream {
                LogStream::Out => format!("Output log not found: {path}"),
                LogStream::Err => format!("Error log not found: {path}"),
            };
            let _ = writeln!(doc, "{}", colors.paint(&missing, theme.error));
            continue;
        }

        let header = format!("=== {label} LOG ({path}) ===");
        let _ = writeln!(doc, "{}", colors.paint_bold(&header, color));

        match fs::read(path) {
            Ok(bytes) => {
                for line in String::from_utf8_lossy(&bytes).lines() {
                    let line = line.trim_end_matches('\r');
                    let _ = writeln!(doc, "{}", colors.line(line));
                }
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "failed to read log file");
                let msg = format!("Error reading file: {path}");
                let _ = writeln!(doc, "{}", colors.paint(&msg, theme.error));
            }
        }
    }

    doc
}
