//! Errors raised while loading configuration.

use std::io;
use std::path::PathBuf;

use telegraf_plugins::PluginKind;
use thiserror::Error;

/// Errors raised while loading configuration files or directories.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Error loading {}: {source}", path.display())]
    Read {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid TOML.
    #[error("Error parsing {}, {source}", path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser diagnostic.
        #[source]
        source: toml::de::Error,
    },

    /// A top-level section is not one the agent understands.
    #[error("Error parsing {}, unsupported config format: {section}", path.display())]
    UnsupportedSection {
        /// File containing the section.
        path: PathBuf,
        /// Offending section name.
        section: String,
    },

    /// A known section has the wrong shape.
    #[error("Error parsing {}, invalid configuration: {section} {reason}", path.display())]
    InvalidSection {
        /// File containing the section.
        path: PathBuf,
        /// Section (or dotted key) that was malformed.
        section: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A plugin table names a plugin the catalogue does not know.
    #[error("Error parsing {}, Undefined but requested {kind}: {name}", path.display())]
    UndefinedPlugin {
        /// File containing the plugin table.
        path: PathBuf,
        /// Plugin kind.
        kind: PluginKind,
        /// Requested plugin name.
        name: String,
    },

    /// The `[agent]` table could not be decoded.
    #[error("Error parsing {}, invalid [agent] settings: {source}", path.display())]
    AgentSettings {
        /// File containing the table.
        path: PathBuf,
        /// Decoder diagnostic.
        #[source]
        source: toml::de::Error,
    },

    /// A duration setting is not a valid duration string.
    #[error("Error parsing {}, invalid duration for {field}: {value:?}", path.display())]
    InvalidDuration {
        /// File containing the setting.
        path: PathBuf,
        /// Setting name.
        field: &'static str,
        /// Raw value.
        value: String,
        /// Parser diagnostic.
        #[source]
        source: humantime::DurationError,
    },

    /// A configuration directory could not be listed.
    #[error("Error reading config directory {}: {source}", path.display())]
    ReadDirectory {
        /// Directory that failed to list.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}
