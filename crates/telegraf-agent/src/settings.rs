//! Per-engine runtime settings derived from the `[agent]` table.

use sysinfo::System;
use telegraf_config::AgentConfig;

/// Runtime settings of one engine instance.
///
/// Seeded from the `[agent]` table; the controller may flip `debug` and
/// `quiet` afterwards without touching the configuration it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    /// Log every gathered sample.
    pub debug: bool,
    /// Suppress informational engine logs.
    pub quiet: bool,
    /// Value of the `host` tag, `None` when omitted.
    pub hostname: Option<String>,
}

impl AgentSettings {
    /// Derives runtime settings, asking the operating system for the hostname
    /// when the configuration leaves it empty.
    #[must_use]
    pub fn from_config(agent: &AgentConfig) -> Self {
        let hostname = if agent.omit_hostname {
            None
        } else if agent.hostname.is_empty() {
            System::host_name()
        } else {
            Some(agent.hostname.clone())
        };
        Self {
            debug: agent.debug,
            quiet: agent.quiet,
            hostname,
        }
    }
}
