//! slog - view SLURM job logs.

mod error;
mod list;
mod logging;
mod status;

use clap::{CommandFactory, Parser};
use error::AppError;
use slog_cli::Args;
use slog_config::{Config, ConfigError};
use slog_core::{JobToken, resolve};
use slog_slurm::SlurmStatusQuerier;
use slog_view::{
    Action, Colorizer, CommandPager, DisplayMode, Presenter, PresenterOptions, Theme, WatchOutcome,
};
use std::future::Future;
use std::io::{self, IsTerminal, Write};
use std::pin::Pin;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = slog_config::load();
    logging::init(
        args.verbose,
        config.as_ref().ok().and_then(|c| c.log_level.as_deref()),
    );

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_broken_pipe() => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    }
}

async fn run(args: Args, config: Result<Config, ConfigError>) -> Result<(), AppError> {
    let config = config?;
    tracing::debug!(source = %config.source, "config loaded");

    let stdout_tty = io::stdout().is_terminal();
    let colors = Colorizer::new(stdout_tty && !args.no_color, Theme::default());
    let mut stdout = io::stdout();

    if args.list {
        list::write_recent(&mut stdout, &config.dirs, &colors)?;
        return Ok(());
    }

    let Some(token) = args.job.as_ref() else {
        Args::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "a job ID, job name, or `last` is required",
            )
            .exit()
    };
    let mode = args.display_mode();

    // A watched job may not have written any logs yet; wait on its ID instead.
    let resolved = match resolve(token, &config.dirs) {
        Ok(resolved) => Some(resolved),
        Err(err) if mode.action == Action::Watch && token.job_id().is_some() => {
            tracing::debug!(error = %err, "no logs yet, watching by job ID");
            None
        }
        Err(err) => return Err(err.into()),
    };

    if let (JobToken::Latest, Some(resolved)) = (token, &resolved) {
        let text = format!(
            "Showing logs for most recent job: {}-{}",
            resolved.name, resolved.job_id
        );
        writeln!(stdout, "{}", colors.paint_bold(&text, colors.theme().highlight))?;
        writeln!(stdout)?;
    }

    if args.status {
        let job_id = match &resolved {
            Some(resolved) => resolved.job_id.as_str(),
            None => token.job_id().unwrap_or_default(),
        };
        let table = status::fetch_table(job_id).await;
        status::write_status(&mut stdout, job_id, table.as_deref(), &colors)?;
    }

    let defaults = PresenterOptions::default();
    let options = PresenterOptions {
        use_pager: stdout_tty && !args.no_pager,
        watch_interval: config.watch_interval,
        max_wait: args.max_wait().or(config.max_wait),
        status_interval: args.status_interval().unwrap_or(defaults.status_interval),
        ..defaults
    };
    let mut presenter = Presenter::new(
        colors,
        CommandPager::new(config.pager.clone()),
        SlurmStatusQuerier,
        options,
        stdout,
    );

    let shutdown = interrupted();
    tokio::pin!(shutdown);

    match resolved {
        Some(resolved) => presenter.present(&resolved, mode, shutdown).await?,
        None => {
            let job_id = token.job_id().unwrap_or_default();
            watch_unresolved(&mut presenter, token, job_id, &config, mode, shutdown.as_mut())
                .await?
        }
    }
    Ok(())
}

/// Watch a job by ID, then dump whatever logs it left behind.
async fn watch_unresolved<W: Write>(
    presenter: &mut Presenter<CommandPager, SlurmStatusQuerier, W>,
    token: &JobToken,
    job_id: &str,
    config: &Config,
    mode: DisplayMode,
    mut shutdown: Pin<&mut impl Future<Output = ()>>,
) -> Result<(), AppError> {
    if presenter.watch(job_id, shutdown.as_mut()).await? == WatchOutcome::Interrupted {
        return Ok(());
    }
    let resolved = resolve(token, &config.dirs)?;
    presenter
        .present(&resolved, DisplayMode::new(Action::Dump, mode.streams), shutdown)
        .await?;
    Ok(())
}

/// Resolves on Ctrl-C.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
