//! In-memory plugin catalogue.
//!
//! The [`PluginRegistry`] keeps input and output plugins in separate
//! name-ordered maps so that listings and generated configuration are stable
//! across runs.

use std::collections::BTreeMap;

use strum::{Display, EnumString};

use crate::error::PluginError;


/// Whether a plugin produces measurements or ships them somewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PluginKind {
    /// Collects measurements.
    Input,
    /// Writes measurements to a destination.
    Output,
}

impl PluginKind {
    /// Name of the configuration section holding plugins of this kind.
    #[must_use]
    pub const fn section(self) -> &'static str {
        match self {
            Self::Input => "inputs",
            Self::Output => "outputs",
        }
    }
}

/// Static description of a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginSpec {
    kind: PluginKind,
    name: &'static str,
    description: &'static str,
    sample_config: &'static str,
    default_enabled: bool,
}

impl PluginSpec {
    /// Creates a plugin description.
    ///
    /// `sample_config` holds the body lines of the plugin's table, already
    /// indented, and may be empty.
    #[must_use]
    pub const fn new(
        kind: PluginKind,
        name: &'static str,
        description: &'static str,
        sample_config: &'static str,
    ) -> Self {
        Self {
            kind,
            name,
            description,
            sample_config,
            default_enabled: false,
        }
    }

    /// Marks the plugin as part of the default generated configuration.
    #[must_use]
    pub const fn enabled_by_default(mut self) -> Self {
        self.default_enabled = true;
        self
    }

    /// Plugin kind.
    #[must_use]
    pub const fn kind(&self) -> PluginKind {
        self.kind
    }

    /// Registered name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// One-line description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }

    /// Body of the sample configuration table.
    #[must_use]
    pub const fn sample_config(&self) -> &'static str {
        self.sample_config
    }

    /// Whether the plugin is live in the default generated configuration.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.default_enabled
    }

    /// Renders the plugin's usage block: description comment, table header
    /// and sample body.
    ///
    /// # Examples
    ///
    /// ```
    /// use telegraf_plugins::{PluginKind, PluginSpec};
    ///
    /// let spec = PluginSpec::new(PluginKind::Output, "discard", "Drop everything", "");
    /// assert_eq!(spec.usage(), "# Drop everything\n[[outputs.discard]]\n");
    /// ```
    #[must_use]
    pub fn usage(&self) -> String {
        let mut text = format!(
            "# {}\n[[{}.{}]]\n",
            self.description,
            self.kind.section(),
            self.name
        );
        for line in self.sample_config.lines() {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

/// Registry of known plugins keyed by kind and name.
///
/// # Examples
///
/// ```
/// use telegraf_plugins::{PluginKind, PluginRegistry};
///
/// let registry = PluginRegistry::builtin();
/// assert!(registry.get(PluginKind::Input, "cpu").is_some());
/// assert!(registry.get(PluginKind::Output, "cpu").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    inputs: BTreeMap<&'static str, PluginSpec>,
    outputs: BTreeMap<&'static str, PluginSpec>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every plugin bundled with the agent.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for spec in crate::builtin::PLUGINS {
            registry.insert(*spec);
        }
        registry
    }

    fn insert(&mut self, spec: PluginSpec) {
        let map = match spec.kind() {
            PluginKind::Input => &mut self.inputs,
            PluginKind::Output => &mut self.outputs,
        };
        map.insert(spec.name(), spec);
    }

    fn map(&self, kind: PluginKind) -> &BTreeMap<&'static str, PluginSpec> {
        match kind {
            PluginKind::Input => &self.inputs,
            PluginKind::Output => &self.outputs,
        }
    }

    /// Looks up a plugin by kind and name.
    #[must_use]
    pub fn get(&self, kind: PluginKind, name: &str) -> Option<&PluginSpec> {
        self.map(kind).get(name)
    }

    /// Looks up a plugin, reporting a typed error when it is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InputNotFound`] or
    /// [`PluginError::OutputNotFound`] depending on `kind`.
    pub fn lookup(&self, kind: PluginKind, name: &str) -> Result<&PluginSpec, PluginError> {
        self.get(kind, name)
            .ok_or_else(|| PluginError::not_found(kind, name))
    }

    /// Plugins of `kind` in name order.
    pub fn specs(&self, kind: PluginKind) -> impl Iterator<Item = &PluginSpec> {
        self.map(kind).values()
    }
}
