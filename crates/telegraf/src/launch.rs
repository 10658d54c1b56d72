//! Engine construction and the test/run branch.

use std::io::Write;
use std::path::Path;

use telegraf_agent::{Agent, AgentError};
use telegraf_config::Config;
use thiserror::Error;
use tracing::debug;

use crate::arguments::ResolvedArguments;
use crate::info::VERSION;
use crate::pidfile::{PidfileError, write_pidfile};
use crate::reporter::{LAUNCH_TARGET, LifecycleReporter};

/// Verbosity overrides applied after construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RuntimeOverrides {
    pub(crate) debug: bool,
    pub(crate) quiet: bool,
}

/// A constructed collection engine.
pub(crate) trait Engine {
    /// Configuration the engine was built from.
    fn config(&self) -> &Config;

    /// Applies cycle-scoped verbosity overrides.
    fn apply_overrides(&mut self, overrides: RuntimeOverrides);

    /// Runs one collection pass, printing samples to `out`.
    fn test(&mut self, out: &mut dyn Write) -> Result<(), AgentError>;

    /// Connects every output.
    fn connect(&mut self) -> Result<(), AgentError>;
}

/// Builds engines from validated configuration.
pub(crate) trait EngineFactory {
    /// Constructs an engine owning `config`.
    fn build(&self, config: Config) -> Result<Box<dyn Engine>, AgentError>;
}

/// Factory for the bundled [`Agent`].
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct AgentFactory;

impl EngineFactory for AgentFactory {
    fn build(&self, config: Config) -> Result<Box<dyn Engine>, AgentError> {
        Ok(Box::new(Agent::new(config)?))
    }
}

impl Engine for Agent {
    fn config(&self) -> &Config {
        Agent::config(self)
    }

    fn apply_overrides(&mut self, overrides: RuntimeOverrides) {
        let settings = self.settings_mut();
        if overrides.debug {
            settings.debug = true;
        }
        if overrides.quiet {
            settings.quiet = true;
        }
    }

    fn test(&mut self, out: &mut dyn Write) -> Result<(), AgentError> {
        Agent::test(self, out)
    }

    fn connect(&mut self) -> Result<(), AgentError> {
        Agent::connect(self)
    }
}

/// Errors raised while launching the engine.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The engine rejected the configuration.
    #[error("{0}")]
    EngineConstruction(#[source] AgentError),
    /// The `-test` collection pass failed.
    #[error("{0}")]
    TestPass(#[source] AgentError),
    /// An output failed to connect.
    #[error("{0}")]
    Connect(#[source] AgentError),
    /// The pidfile could not be written.
    #[error(transparent)]
    Pidfile(#[from] PidfileError),
}

/// Result of a successful launch.
pub(crate) enum LaunchOutcome {
    /// The test pass ran; nothing keeps running.
    Tested,
    /// Outputs are connected and the engine is live for this cycle.
    Running(Box<dyn Engine>),
}

/// Constructs the engine and runs either the test pass or the connect
/// sequence.
pub(crate) fn launch_with(
    engines: &dyn EngineFactory,
    config: Config,
    args: &ResolvedArguments,
    reporter: &dyn LifecycleReporter,
    out: &mut dyn Write,
) -> Result<LaunchOutcome, LaunchError> {
    let mut engine = engines
        .build(config)
        .map_err(LaunchError::EngineConstruction)?;
    engine.apply_overrides(RuntimeOverrides {
        debug: args.debug(),
        quiet: args.quiet(),
    });

    if args.test() {
        engine.test(out).map_err(LaunchError::TestPass)?;
        reporter.test_pass_completed();
        return Ok(LaunchOutcome::Tested);
    }

    engine.connect().map_err(LaunchError::Connect)?;
    reporter.engine_started(VERSION, engine.config());

    if let Some(path) = args.pidfile() {
        record_pid(path, reporter)?;
    }
    Ok(LaunchOutcome::Running(engine))
}

fn record_pid(path: &Path, reporter: &dyn LifecycleReporter) -> Result<(), PidfileError> {
    let pid = std::process::id();
    debug!(target: LAUNCH_TARGET, pid, file = %path.display(), "writing pidfile");
    write_pidfile(path, pid)?;
    reporter.pidfile_written(path, pid);
    Ok(())
}
