//! Structured reporting for lifecycle events.

use std::path::Path;
use std::sync::Arc;

use telegraf_config::Config;

use crate::bootstrap::BootstrapError;

pub(crate) const BOOTSTRAP_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bootstrap");
pub(crate) const LAUNCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::launch");

/// Observer used to surface lifecycle events to telemetry sinks.
pub trait LifecycleReporter: Send + Sync {
    /// Invoked before the primary configuration file is loaded.
    fn bootstrap_starting(&self, config_path: &Path);

    /// Invoked after a supplementary directory was merged.
    fn directory_merged(&self, directory: &Path);

    /// Invoked after loading and validation succeeded.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when loading or validation fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked after a `-test` collection pass.
    fn test_pass_completed(&self);

    /// Invoked once outputs are connected; carries the startup banner.
    fn engine_started(&self, version: &str, config: &Config);

    /// Invoked after the pidfile was written.
    fn pidfile_written(&self, path: &Path, pid: u32);
}

impl<T> LifecycleReporter for Arc<T>
where
    T: LifecycleReporter,
{
    fn bootstrap_starting(&self, config_path: &Path) {
        (**self).bootstrap_starting(config_path);
    }

    fn directory_merged(&self, directory: &Path) {
        (**self).directory_merged(directory);
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn test_pass_completed(&self) {
        (**self).test_pass_completed();
    }

    fn engine_started(&self, version: &str, config: &Config) {
        (**self).engine_started(version, config);
    }

    fn pidfile_written(&self, path: &Path, pid: u32) {
        (**self).pidfile_written(path, pid);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredReporter;

impl LifecycleReporter for StructuredReporter {
    fn bootstrap_starting(&self, config_path: &Path) {
        tracing::info!(
            target: BOOTSTRAP_TARGET,
            event = "bootstrap_starting",
            config = %config_path.display(),
            "loading configuration"
        );
    }

    fn directory_merged(&self, directory: &Path) {
        tracing::info!(
            target: BOOTSTRAP_TARGET,
            event = "directory_merged",
            directory = %directory.display(),
            "configuration directory merged"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: BOOTSTRAP_TARGET,
            event = "bootstrap_succeeded",
            inputs = config.inputs().len(),
            outputs = config.outputs().len(),
            "configuration validated"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: BOOTSTRAP_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "configuration bootstrap failed"
        );
    }

    fn test_pass_completed(&self) {
        tracing::info!(
            target: LAUNCH_TARGET,
            event = "test_pass_completed",
            "test collection pass completed"
        );
    }

    fn engine_started(&self, version: &str, config: &Config) {
        tracing::info!(target: LAUNCH_TARGET, "Starting Telegraf (version {version})");
        tracing::info!(
            target: LAUNCH_TARGET,
            "Loaded outputs: {}",
            config.output_names().join(" ")
        );
        tracing::info!(
            target: LAUNCH_TARGET,
            "Loaded inputs: {}",
            config.input_names().join(" ")
        );
        tracing::info!(target: LAUNCH_TARGET, "Tags enabled: {}", config.list_tags());
    }

    fn pidfile_written(&self, path: &Path, pid: u32) {
        tracing::info!(
            target: LAUNCH_TARGET,
            event = "pidfile_written",
            pid,
            file = %path.display(),
            "pid file written"
        );
    }
}
