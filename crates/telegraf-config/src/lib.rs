//! Configuration model for the Telegraf agent.
//!
//! A [`Config`] starts empty, receives the name filters chosen on the command
//! line, then accumulates one primary TOML file and any number of
//! supplementary `*.conf` directories. The [`sample`] module renders the
//! commented configuration printed by `-sample-config`.

mod agent;
mod config;
mod document;
mod error;
mod plugin;
pub mod sample;

pub use agent::AgentConfig;
pub use config::Config;
pub use error::ConfigError;
pub use plugin::PluginInstance;
pub use sample::{render_sample_config, write_sample_config};

/// Tracing target used by configuration loading.
pub(crate) const CONFIG_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::load");
