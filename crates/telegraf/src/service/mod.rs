//! Integration with the platform service manager.
//!
//! Administrative actions (install, remove, start, stop) are one-shot calls
//! through [`ServiceControl`]. Normal operation hands a run callback and a
//! stop callback to [`ServiceHost::run_as_service`].

mod signals;
mod systemd;

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

pub(crate) use signals::host_callbacks;
pub use signals::{ShutdownError, ShutdownSignal, TerminationSignals};
pub use systemd::SystemdServiceManager;

use crate::arguments::{AdminAction, ServiceDescriptor};
use crate::errors::ControllerError;

pub(crate) const SERVICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::service");

/// What a completed run callback left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing is running; the host may return immediately.
    Finished,
    /// The engine reached run mode; the host waits for a stop request.
    Serving,
}

/// Callback the host invokes once when the service is activated.
pub type RunCallback<'a> = Box<dyn FnOnce() -> Result<RunState, ControllerError> + 'a>;

/// Callback the host invokes when a stop is requested. Must not block.
pub type StopCallback = Arc<dyn Fn() + Send + Sync>;

/// A call to the platform service manager failed.
#[derive(Debug, Error)]
pub enum ServiceControlError {
    /// The path of the running executable could not be determined.
    #[error("failed to resolve the executable path: {0}")]
    CurrentExe(#[source] io::Error),
    /// The unit file could not be written.
    #[error("failed to write unit file {}: {source}", path.display())]
    WriteUnit {
        /// Unit file path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The unit file could not be removed.
    #[error("failed to remove unit file {}: {source}", path.display())]
    RemoveUnit {
        /// Unit file path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The manager's control program could not be run.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The manager's control program reported failure.
    #[error("{command} failed ({status}): {stderr}")]
    Exit {
        /// Command line that was run.
        command: String,
        /// Exit status.
        status: ExitStatus,
        /// Trimmed standard error output.
        stderr: String,
    },
}

/// Errors raised by service management.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Installing the service failed.
    #[error("installService({name}, {description}): {source}")]
    Install {
        /// Service name.
        name: String,
        /// Service description.
        description: String,
        /// Manager failure.
        #[source]
        source: ServiceControlError,
    },
    /// Removing the service failed.
    #[error("removeService: {0}")]
    Remove(#[source] ServiceControlError),
    /// Starting the service failed.
    #[error("startService: {0}")]
    Start(#[source] ServiceControlError),
    /// Stopping the service failed.
    #[error("stopService: {0}")]
    Stop(#[source] ServiceControlError),
    /// Stop-request handling could not be installed or failed.
    #[error("runService: {0}")]
    Shutdown(#[from] ShutdownError),
    /// The stop watcher thread could not be started.
    #[error("runService: failed to spawn stop watcher: {0}")]
    SpawnWatcher(#[source] io::Error),
    /// The stop watcher ended without reporting a stop request.
    #[error("runService: stop watcher exited unexpectedly")]
    WatcherLost,
    /// The run callback failed.
    #[error(transparent)]
    Run(Box<ControllerError>),
}

/// One-shot administrative primitives of a service manager.
pub trait ServiceControl {
    /// Registers the service.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceControlError`] when the manager rejects the request.
    fn install(&self, descriptor: &ServiceDescriptor) -> Result<(), ServiceControlError>;

    /// Unregisters the service called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceControlError`] when the manager rejects the request.
    fn remove(&self, name: &str) -> Result<(), ServiceControlError>;

    /// Starts the service called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceControlError`] when the manager rejects the request.
    fn start(&self, name: &str) -> Result<(), ServiceControlError>;

    /// Stops the service called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceControlError`] when the manager rejects the request.
    fn stop(&self, name: &str) -> Result<(), ServiceControlError>;
}

/// Run/stop dispatch of a service manager.
pub trait ServiceHost {
    /// Whether the process already runs under the manager's dispatch, in
    /// which case the run sequence is invoked directly.
    fn in_service_mode(&self) -> bool;

    /// Runs `on_run` under the manager's dispatch, invoking `on_stop` when a
    /// stop is requested.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Run`] when `on_run` fails, or another
    /// [`ServiceError`] when stop handling cannot be established.
    fn run_as_service(
        &self,
        descriptor: &ServiceDescriptor,
        on_run: RunCallback<'_>,
        on_stop: StopCallback,
    ) -> Result<(), ServiceError>;
}

/// A complete service manager.
pub trait ServiceManager: ServiceControl + ServiceHost {}

impl<T> ServiceManager for T where T: ServiceControl + ServiceHost {}

/// Runs one administrative action, naming it in any error.
pub(crate) fn run_admin_action(
    control: &dyn ServiceControl,
    action: AdminAction,
    descriptor: &ServiceDescriptor,
) -> Result<(), ServiceError> {
    info!(
        target: SERVICE_TARGET,
        action = ?action,
        service = descriptor.name(),
        "running service action"
    );
    match action {
        AdminAction::Install => {
            control
                .install(descriptor)
                .map_err(|source| ServiceError::Install {
                    name: descriptor.name().to_owned(),
                    description: descriptor.description().to_owned(),
                    source,
                })
        }
        AdminAction::Remove => control.remove(descriptor.name()).map_err(ServiceError::Remove),
        AdminAction::Start => control.start(descriptor.name()).map_err(ServiceError::Start),
        AdminAction::Stop => control.stop(descriptor.name()).map_err(ServiceError::Stop),
    }
}

/// Stop callback handed to the host: a best-effort notification only.
pub(crate) fn hard_shutdown_notice() -> StopCallback {
    Arc::new(|| info!(target: SERVICE_TARGET, "Hard Shutdown"))
}
