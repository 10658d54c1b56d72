//! Configured plugin instances.

use toml::Table;

/// One configured instance of an input or output plugin.
///
/// A plugin named once per `[[inputs.<name>]]` table; the same name may
/// appear several times with different options.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginInstance {
    name: String,
    options: Table,
}

impl PluginInstance {
    /// Creates an instance from its plugin name and option table.
    #[must_use]
    pub fn new(name: impl Into<String>, options: Table) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    /// Plugin name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw option table as written in the configuration file.
    #[must_use]
    pub fn options(&self) -> &Table {
        &self.options
    }
}
