//! Top-level error returned by the startup controller.

use std::io;

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::info::InfoError;
use crate::launch::LaunchError;
use crate::service::ServiceError;

/// Any failure that ends a controller run with a non-zero exit status.
///
/// Each variant displays exactly as its source so operators see the
/// underlying message on stderr.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// An informational command failed.
    #[error(transparent)]
    Info(#[from] InfoError),
    /// Configuration could not be loaded or validated.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// The engine could not be started.
    #[error(transparent)]
    Launch(#[from] LaunchError),
    /// A service manager operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// Writing user-facing text failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
