//! Stop requests delivered as termination signals, and the hosting loop
//! that pairs them with the run callback.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;

use signal_hook::consts::signal::{SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use signal_hook::low_level::emulate_default_handler;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{RunCallback, RunState, SERVICE_TARGET, ServiceError, StopCallback};

/// Source of stop requests.
pub trait ShutdownSignal: Send {
    /// Blocks until a stop is requested.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError`] when the source can no longer deliver
    /// requests.
    fn wait(&mut self) -> Result<(), ShutdownError>;

    /// Ends the process the way the last request would have if no handler
    /// were installed.
    ///
    /// Used when a stop arrives while the run callback is still starting up
    /// and nothing else would act on it.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::Terminate`] when the default action could not
    /// be carried out.
    fn terminate(&mut self) -> Result<(), ShutdownError>;
}

/// Errors reported by stop-request sources.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The signal iterator ended without delivering a signal.
    #[error("signal delivery stopped before a stop was requested")]
    Closed,
    /// The default action of a received signal could not be performed.
    #[error("failed to terminate on signal {signal}: {source}")]
    Terminate {
        /// Signal whose default action was requested.
        signal: i32,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Stop requests delivered as SIGTERM, SIGINT or SIGQUIT.
///
/// Handlers are registered on construction, so signals arriving before
/// [`ShutdownSignal::wait`] is called are not lost.
pub struct TerminationSignals {
    signals: Signals,
    received: Option<i32>,
}

impl TerminationSignals {
    /// Registers the termination signal handlers.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::Install`] when registration fails.
    pub fn install() -> Result<Self, ShutdownError> {
        let signals = Signals::new([SIGTERM, SIGINT, SIGQUIT])
            .map_err(|source| ShutdownError::Install { source })?;
        Ok(Self {
            signals,
            received: None,
        })
    }
}

impl ShutdownSignal for TerminationSignals {
    fn wait(&mut self) -> Result<(), ShutdownError> {
        let signal = self.signals.forever().next().ok_or(ShutdownError::Closed)?;
        info!(target: SERVICE_TARGET, signal, "stop signal received");
        self.received = Some(signal);
        Ok(())
    }

    fn terminate(&mut self) -> Result<(), ShutdownError> {
        let signal = self.received.unwrap_or(SIGTERM);
        emulate_default_handler(signal).map_err(|source| ShutdownError::Terminate { signal, source })
    }
}

/// Watches `signal` on a dedicated thread, invoking `on_stop` when it fires,
/// and runs `on_run` on the calling thread.
///
/// Returns as soon as `on_run` finishes with [`RunState::Finished`] or fails;
/// after [`RunState::Serving`] it blocks until the stop request arrived. A
/// stop that arrives while `on_run` is still running terminates the process
/// through [`ShutdownSignal::terminate`] once `on_stop` has run.
pub(crate) fn host_callbacks(
    mut signal: Box<dyn ShutdownSignal>,
    on_run: RunCallback<'_>,
    on_stop: StopCallback,
) -> Result<(), ServiceError> {
    let starting = Arc::new(AtomicBool::new(true));
    let watcher_starting = Arc::clone(&starting);
    let (stopped_tx, stopped_rx) = mpsc::channel();
    thread::Builder::new()
        .name("telegraf-stop".to_owned())
        .spawn(move || {
            let outcome = signal.wait();
            if outcome.is_ok() {
                on_stop();
                if watcher_starting.load(Ordering::SeqCst) {
                    info!(target: SERVICE_TARGET, "stop requested during startup; terminating");
                    if let Err(error) = signal.terminate() {
                        warn!(target: SERVICE_TARGET, error = %error, "could not terminate");
                    }
                }
            }
            if stopped_tx.send(outcome).is_err() {
                debug!(target: SERVICE_TARGET, "stop requested after the run sequence ended");
            }
        })
        .map_err(ServiceError::SpawnWatcher)?;

    let state = on_run();
    starting.store(false, Ordering::SeqCst);
    match state.map_err(|error| ServiceError::Run(Box::new(error)))? {
        RunState::Finished => Ok(()),
        RunState::Serving => match stopped_rx.recv() {
            Ok(outcome) => outcome.map_err(ServiceError::from),
            Err(mpsc::RecvError) => Err(ServiceError::WatcherLost),
        },
    }
}
