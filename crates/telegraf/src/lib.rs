//! Startup and lifecycle controller for the Telegraf agent.
//!
//! The controller turns single-dash long flags into one immutable set of
//! resolved arguments, answers informational requests (`-version`,
//! `-sample-config`, `-usage`), performs one-shot service administration,
//! and otherwise bootstraps configuration and launches the collection engine
//! under the platform service manager. Collaborators (configuration loader,
//! engine factory, lifecycle reporter, service manager) sit behind traits so
//! tests can substitute them; [`run`] wires the production implementations.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use telegraf_plugins::PluginRegistry;

mod arguments;
mod bootstrap;
mod cli;
mod controller;
mod errors;
mod info;
mod launch;
mod localizer;
mod pidfile;
mod reload;
mod reporter;
pub mod service;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use arguments::{AdminAction, ServiceDescriptor};
pub use bootstrap::{BootstrapError, ValidationError};
pub use cli::{DEFAULT_SERVICE_DESCRIPTION, DEFAULT_SERVICE_NAME};
pub use errors::ControllerError;
pub use info::{InfoError, UsageLookupError};
pub use launch::LaunchError;
pub use pidfile::PidfileError;
pub use reporter::{LifecycleReporter, StructuredReporter};

use bootstrap::FileConfigLoader;
use controller::{Collaborators, IoStreams};
use launch::AgentFactory;
use service::SystemdServiceManager;
use telemetry::TelemetrySettings;

/// Runs the controller with the given arguments and IO handles.
///
/// The first argument is the program name. Fatal errors are logged, written
/// to `stderr` and turned into [`ExitCode::FAILURE`].
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let logging =
        TelemetrySettings::from_env().and_then(|settings| telemetry::initialise(&settings));
    if let Err(error) = logging {
        let _ = writeln!(stderr, "warning: {error}; continuing without structured logs");
    }

    let registry = PluginRegistry::builtin();
    let loader = FileConfigLoader::new(registry.clone());
    let manager = SystemdServiceManager::new();
    let deps = Collaborators {
        loader: &loader,
        engines: &AgentFactory,
        reporter: &StructuredReporter,
        registry: &registry,
        manager: &manager,
    };
    let mut io = IoStreams::new(stdout, stderr);
    controller::run_with(&args, deps, &mut io)
}
