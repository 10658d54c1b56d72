//! Startup orchestration: argument handling, administrative actions and the
//! service-hosted reload loop.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use telegraf_plugins::PluginRegistry;
use tracing::{debug, error};

use crate::arguments::ResolvedArguments;
use crate::bootstrap::{ConfigLoader, bootstrap_with};
use crate::cli::{self, CommandLine};
use crate::errors::ControllerError;
use crate::info::{self, Dispatch};
use crate::launch::{EngineFactory, LaunchOutcome, launch_with};
use crate::localizer::{build_localizer, write_usage};
use crate::reload::{RELOAD_TARGET, run_reload_loop};
use crate::reporter::LifecycleReporter;
use crate::service::{
    RunCallback, RunState, ServiceError, ServiceManager, hard_shutdown_notice, run_admin_action,
};

/// Bundles the writers the controller prints to.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

/// Everything a run depends on besides its arguments and streams.
#[derive(Clone, Copy)]
pub(crate) struct Collaborators<'a> {
    pub(crate) loader: &'a dyn ConfigLoader,
    pub(crate) engines: &'a dyn EngineFactory,
    pub(crate) reporter: &'a dyn LifecycleReporter,
    pub(crate) registry: &'a PluginRegistry,
    pub(crate) manager: &'a dyn ServiceManager,
}

/// Runs the controller and maps the outcome onto a process exit status.
pub(crate) fn run_with<W: Write, E: Write>(
    args: &[OsString],
    deps: Collaborators<'_>,
    io: &mut IoStreams<'_, W, E>,
) -> ExitCode {
    match execute(args, deps, io) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "telegraf exited with a fatal error");
            let _ = writeln!(io.stderr, "{err}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W: Write, E: Write>(
    args: &[OsString],
    deps: Collaborators<'_>,
    io: &mut IoStreams<'_, W, E>,
) -> Result<(), ControllerError> {
    let cli = match cli::parse(args) {
        CommandLine::Empty | CommandLine::Help => {
            let localizer = build_localizer();
            write_usage(&mut *io.stdout, localizer.as_ref())?;
            return Ok(());
        }
        CommandLine::Invalid(parse_error) => {
            let _ = writeln!(io.stderr, "{parse_error}");
            let localizer = build_localizer();
            write_usage(&mut *io.stdout, localizer.as_ref())?;
            return Ok(());
        }
        CommandLine::Parsed(cli) => cli,
    };
    let resolved = ResolvedArguments::from_cli(*cli);

    if let Some(action) = resolved.admin_action() {
        run_admin_action(deps.manager, action, resolved.service())?;
        writeln!(io.stdout, "Done")?;
        return Ok(());
    }

    let out: &mut dyn Write = &mut *io.stdout;
    let on_run: RunCallback<'_> = Box::new(move || {
        run_reload_loop(|_token| run_cycle(args, deps, &mut *out))
    });

    if deps.manager.in_service_mode() {
        on_run()?;
        return Ok(());
    }
    deps.manager
        .run_as_service(resolved.service(), on_run, hard_shutdown_notice())
        .map_err(|service_error| match service_error {
            ServiceError::Run(cause) => *cause,
            other => ControllerError::Service(other),
        })
}

/// One reload cycle: resolve arguments, then either answer an informational
/// request or bootstrap and launch the engine.
fn run_cycle(
    args: &[OsString],
    deps: Collaborators<'_>,
    out: &mut dyn Write,
) -> Result<RunState, ControllerError> {
    let CommandLine::Parsed(cli) = cli::parse(args) else {
        debug!(target: RELOAD_TARGET, "arguments no longer describe a run");
        return Ok(RunState::Finished);
    };
    let resolved = ResolvedArguments::from_cli(*cli);

    let config_path = match Dispatch::select(&resolved) {
        Dispatch::Inform(request) => {
            info::handle(&request, &resolved, deps.registry, out)?;
            return Ok(RunState::Finished);
        }
        Dispatch::Proceed(path) => path,
    };

    let config = bootstrap_with(deps.loader, deps.reporter, config_path, &resolved)?;
    match launch_with(deps.engines, config, &resolved, deps.reporter, out)? {
        LaunchOutcome::Tested => Ok(RunState::Finished),
        LaunchOutcome::Running(engine) => {
            drop(engine);
            debug!(target: RELOAD_TARGET, "cycle reached run mode");
            Ok(RunState::Serving)
        }
    }
}
