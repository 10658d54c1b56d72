//! The `[agent]` table and its merge rules.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use toml::Value;

use crate::error::ConfigError;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Settings from the `[agent]` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Default collection interval for all inputs.
    pub interval: Duration,
    /// Default flushing interval for all outputs.
    pub flush_interval: Duration,
    /// Run the agent with debug output.
    pub debug: bool,
    /// Run the agent with informational output suppressed.
    pub quiet: bool,
    /// Hostname override; empty means "ask the operating system".
    pub hostname: String,
    /// Skip the `host` tag entirely.
    pub omit_hostname: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            flush_interval: DEFAULT_INTERVAL,
            debug: false,
            quiet: false,
            hostname: String::new(),
            omit_hostname: false,
        }
    }
}

/// Partial `[agent]` table; only keys that are present overwrite.
#[derive(Debug, Default, Deserialize)]
struct AgentSection {
    interval: Option<String>,
    flush_interval: Option<String>,
    debug: Option<bool>,
    quiet: Option<bool>,
    hostname: Option<String>,
    omit_hostname: Option<bool>,
}

impl AgentConfig {
    pub(crate) fn merge(&mut self, path: &Path, value: Value) -> Result<(), ConfigError> {
        let section = value
            .try_into::<AgentSection>()
            .map_err(|source| ConfigError::AgentSettings {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(raw) = section.interval {
            self.interval = parse_duration(path, "interval", raw)?;
        }
        if let Some(raw) = section.flush_interval {
            self.flush_interval = parse_duration(path, "flush_interval", raw)?;
        }
        if let Some(debug) = section.debug {
            self.debug = debug;
        }
        if let Some(quiet) = section.quiet {
            self.quiet = quiet;
        }
        if let Some(hostname) = section.hostname {
            self.hostname = hostname;
        }
        if let Some(omit) = section.omit_hostname {
            self.omit_hostname = omit;
        }
        Ok(())
    }
}

fn parse_duration(path: &Path, field: &'static str, raw: String) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim()).map_err(|source| ConfigError::InvalidDuration {
        path: path.to_path_buf(),
        field,
        value: raw,
        source,
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn merged(source: &str) -> Result<AgentConfig, ConfigError> {
        let value = Value::Table(toml::from_str(source).expect("valid toml"));
        let mut config = AgentConfig::default();
        config.merge(Path::new("agent.conf"), value)?;
        Ok(config)
    }

    #[test]
    fn absent_keys_keep_defaults() {
        let config = merged("debug = true").expect("merge");
        assert!(config.debug);
        assert_eq!(config.interval, DEFAULT_INTERVAL);
        assert_eq!(config.hostname, "");
    }

    #[rstest]
    #[case("interval = \"30s\"", Duration::from_secs(30))]
    #[case("interval = \"1m 30s\"", Duration::from_secs(90))]
    #[case("interval = \" 500ms \"", Duration::from_millis(500))]
    fn parses_interval_durations(#[case] source: &str, #[case] expected: Duration) {
        assert_eq!(merged(source).expect("merge").interval, expected);
    }

    #[test]
    fn rejects_malformed_duration() {
        let err = merged("flush_interval = \"often\"").expect_err("bad duration");
        assert!(matches!(
            err,
            ConfigError::InvalidDuration {
                field: "flush_interval",
                ..
            }
        ));
    }

    #[test]
    fn rejects_wrongly_typed_setting() {
        let err = merged("debug = \"yes\"").expect_err("bad type");
        assert!(matches!(err, ConfigError::AgentSettings { .. }));
    }
}
