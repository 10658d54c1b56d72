//! Errors raised by plugin catalogue lookups.

use thiserror::Error;

use crate::registry::PluginKind;

/// Errors arising from registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    /// No input plugin is registered under the requested name.
    #[error("Input {name} not found")]
    InputNotFound {
        /// Name that was looked up.
        name: String,
    },

    /// No output plugin is registered under the requested name.
    #[error("Output {name} not found")]
    OutputNotFound {
        /// Name that was looked up.
        name: String,
    },
}

impl PluginError {
    /// Builds the not-found error matching `kind`.
    #[must_use]
    pub fn not_found(kind: PluginKind, name: impl Into<String>) -> Self {
        let name = name.into();
        match kind {
            PluginKind::Input => Self::InputNotFound { name },
            PluginKind::Output => Self::OutputNotFound { name },
        }
    }
}
