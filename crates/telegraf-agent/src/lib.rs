//! Minimal collection engine driven by a [`telegraf_config::Config`].
//!
//! The [`Agent`] resolves configured plugin instances into the built-in
//! gatherers and writers, runs a one-shot test pass, and connects outputs for
//! continuous operation.

mod agent;
mod error;
mod inputs;
mod outputs;
mod sample;
mod settings;

pub use agent::Agent;
pub use error::AgentError;
pub use sample::Sample;
pub use settings::AgentSettings;

pub(crate) const AGENT_TARGET: &str = env!("CARGO_PKG_NAME");
