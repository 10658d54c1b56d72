//! Catalogue of the input and output plugins the agent knows about.
//!
//! The registry answers three questions for the rest of the workspace: which
//! plugin names exist, what each plugin's sample configuration looks like, and
//! which plugins belong in a freshly generated configuration file.

pub mod builtin;
pub mod error;
pub mod registry;

pub use error::PluginError;
pub use registry::{PluginKind, PluginRegistry, PluginSpec};
