//! The configuration handle handed from bootstrap to the engine.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use telegraf_plugins::PluginRegistry;
use tracing::debug;

use crate::CONFIG_TARGET;
use crate::agent::AgentConfig;
use crate::document;
use crate::error::ConfigError;
use crate::plugin::PluginInstance;


/// Accumulated agent configuration.
///
/// Filters must be set before any file is loaded: plugins they exclude are
/// skipped during parsing rather than removed afterwards.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use telegraf_config::Config;
///
/// let mut config = Config::new();
/// config.set_input_filters(vec!["cpu".to_owned()]);
/// config.load_config(Path::new("/etc/telegraf/telegraf.conf"))?;
/// println!("{}", config.input_names().join(" "));
/// # Ok::<(), telegraf_config::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    registry: PluginRegistry,
    input_filters: Vec<String>,
    output_filters: Vec<String>,
    tags: BTreeMap<String, String>,
    agent: AgentConfig,
    inputs: Vec<PluginInstance>,
    outputs: Vec<PluginInstance>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Creates an empty configuration backed by the bundled plugin catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(PluginRegistry::builtin())
    }

    /// Creates an empty configuration validating plugin names against
    /// `registry`.
    #[must_use]
    pub fn with_registry(registry: PluginRegistry) -> Self {
        Self {
            registry,
            input_filters: Vec::new(),
            output_filters: Vec::new(),
            tags: BTreeMap::new(),
            agent: AgentConfig::default(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Restricts subsequently loaded inputs to `filters`; empty means all.
    pub fn set_input_filters(&mut self, filters: Vec<String>) {
        self.input_filters = filters;
    }

    /// Restricts subsequently loaded outputs to `filters`; empty means all.
    pub fn set_output_filters(&mut self, filters: Vec<String>) {
        self.output_filters = filters;
    }

    /// Loads one configuration file into this handle.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or contains an
    /// unsupported section, an unknown plugin, or malformed agent settings.
    pub fn load_config(&mut self, path: &Path) -> Result<(), ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        document::apply(self, path, &contents)?;
        debug!(
            target: CONFIG_TARGET,
            file = %path.display(),
            inputs = self.inputs.len(),
            outputs = self.outputs.len(),
            "configuration file loaded"
        );
        Ok(())
    }

    /// Loads every `*.conf` file in `dir`, in file-name order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadDirectory`] when the directory cannot be
    /// listed, or the first error raised by an individual file.
    pub fn load_directory(&mut self, dir: &Path) -> Result<(), ConfigError> {
        let read_error = |source| ConfigError::ReadDirectory {
            path: dir.to_path_buf(),
            source,
        };
        let mut files: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_error)? {
            let path = entry.map_err(read_error)?.path();
            let is_conf = path.extension().is_some_and(|ext| ext == "conf");
            if is_conf && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        for file in &files {
            self.load_config(file)?;
        }
        Ok(())
    }

    /// Catalogue used to validate plugin names.
    #[must_use]
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Active input filters.
    #[must_use]
    pub fn input_filters(&self) -> &[String] {
        &self.input_filters
    }

    /// Active output filters.
    #[must_use]
    pub fn output_filters(&self) -> &[String] {
        &self.output_filters
    }

    /// Global tags attached to every measurement.
    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Agent settings.
    #[must_use]
    pub fn agent(&self) -> &AgentConfig {
        &self.agent
    }

    /// Configured inputs in load order.
    #[must_use]
    pub fn inputs(&self) -> &[PluginInstance] {
        &self.inputs
    }

    /// Configured outputs in load order.
    #[must_use]
    pub fn outputs(&self) -> &[PluginInstance] {
        &self.outputs
    }

    /// Names of the configured inputs in load order.
    #[must_use]
    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(PluginInstance::name).collect()
    }

    /// Names of the configured outputs in load order.
    #[must_use]
    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.iter().map(PluginInstance::name).collect()
    }

    /// Global tags rendered as space-separated `key=value` pairs in key
    /// order.
    #[must_use]
    pub fn list_tags(&self) -> String {
        self.tags
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn agent_mut(&mut self) -> &mut AgentConfig {
        &mut self.agent
    }

    pub(crate) fn insert_tag(&mut self, key: String, value: String) {
        self.tags.insert(key, value);
    }

    pub(crate) fn push_input(&mut self, instance: PluginInstance) {
        self.inputs.push(instance);
    }

    pub(crate) fn push_output(&mut self, instance: PluginInstance) {
        self.outputs.push(instance);
    }
}
