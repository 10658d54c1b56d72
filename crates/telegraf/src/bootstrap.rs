//! Configuration bootstrap: primary file, supplementary directories,
//! validation.

use std::path::{Path, PathBuf};

use telegraf_config::{Config, ConfigError};
use telegraf_plugins::PluginRegistry;
use thiserror::Error;

use crate::arguments::ResolvedArguments;
use crate::reporter::LifecycleReporter;

/// Loads configuration files into a [`Config`].
pub(crate) trait ConfigLoader {
    /// Creates a configuration with the given filters and loads `path`.
    fn load(
        &self,
        path: &Path,
        input_filters: &[String],
        output_filters: &[String],
    ) -> Result<Config, ConfigError>;

    /// Merges every `*.conf` file in `directory` into `config`.
    fn merge_directory(&self, config: &mut Config, directory: &Path) -> Result<(), ConfigError>;
}

/// Loader reading TOML files from disk against a plugin catalogue.
#[derive(Debug, Clone)]
pub(crate) struct FileConfigLoader {
    registry: PluginRegistry,
}

impl FileConfigLoader {
    pub(crate) fn new(registry: PluginRegistry) -> Self {
        Self { registry }
    }
}

impl ConfigLoader for FileConfigLoader {
    fn load(
        &self,
        path: &Path,
        input_filters: &[String],
        output_filters: &[String],
    ) -> Result<Config, ConfigError> {
        let mut config = Config::with_registry(self.registry.clone());
        config.set_input_filters(input_filters.to_vec());
        config.set_output_filters(output_filters.to_vec());
        config.load_config(path)?;
        Ok(config)
    }

    fn merge_directory(&self, config: &mut Config, directory: &Path) -> Result<(), ConfigError> {
        config.load_directory(directory)
    }
}

/// Loaded configuration has nothing to collect from or write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No output survived loading and filtering.
    #[error("Error: no outputs found, did you provide a valid config file?")]
    NoOutputs,
    /// No input survived loading and filtering.
    #[error("Error: no inputs found, did you provide a valid config file?")]
    NoInputs,
}

/// Errors raised while bootstrapping configuration.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The primary configuration file failed to load.
    #[error("{source}")]
    ConfigLoad {
        /// Primary configuration path.
        path: PathBuf,
        /// Loader failure.
        #[source]
        source: ConfigError,
    },
    /// A supplementary configuration directory failed to merge.
    #[error("{source}")]
    DirectoryMerge {
        /// Directory being merged.
        path: PathBuf,
        /// Loader failure.
        #[source]
        source: ConfigError,
    },
    /// The merged configuration is unusable.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Loads `config_path`, merges the legacy then the current configuration
/// directory, and validates the result.
pub(crate) fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: &dyn LifecycleReporter,
    config_path: &Path,
    args: &ResolvedArguments,
) -> Result<Config, BootstrapError> {
    reporter.bootstrap_starting(config_path);
    let result = load_and_validate(loader, reporter, config_path, args);
    match &result {
        Ok(config) => reporter.bootstrap_succeeded(config),
        Err(error) => reporter.bootstrap_failed(error),
    }
    result
}

fn load_and_validate(
    loader: &dyn ConfigLoader,
    reporter: &dyn LifecycleReporter,
    config_path: &Path,
    args: &ResolvedArguments,
) -> Result<Config, BootstrapError> {
    let mut config = loader
        .load(config_path, args.input_filters(), args.output_filters())
        .map_err(|source| BootstrapError::ConfigLoad {
            path: config_path.to_path_buf(),
            source,
        })?;

    for directory in args.config_directories() {
        loader
            .merge_directory(&mut config, directory)
            .map_err(|source| BootstrapError::DirectoryMerge {
                path: directory.to_path_buf(),
                source,
            })?;
        reporter.directory_merged(directory);
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ValidationError> {
    if config.outputs().is_empty() {
        return Err(ValidationError::NoOutputs);
    }
    if config.inputs().is_empty() {
        return Err(ValidationError::NoInputs);
    }
    Ok(())
}
