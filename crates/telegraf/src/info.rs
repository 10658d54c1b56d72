//! One-shot informational commands.

use std::io::{self, Write};
use std::path::Path;

use telegraf_config::write_sample_config;
use telegraf_plugins::{PluginError, PluginKind, PluginRegistry};
use thiserror::Error;

use crate::arguments::ResolvedArguments;
use crate::cli::write_flag_defaults;

/// Version reported by `-version` and the startup banner.
pub(crate) const VERSION: &str = match option_env!("TELEGRAF_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

/// Neither an input nor an output plugin matched a `-usage` request.
///
/// Both lookup failures are kept so callers can inspect each one.
#[derive(Debug, Error)]
#[error("{input} and {output}")]
pub struct UsageLookupError {
    /// Failure looking the name up as an input.
    pub input: PluginError,
    /// Failure looking the name up as an output.
    pub output: PluginError,
}

/// Errors raised by informational commands.
#[derive(Debug, Error)]
pub enum InfoError {
    /// `-usage` named an unknown plugin.
    #[error(transparent)]
    UsageLookup(#[from] UsageLookupError),
    /// Writing to stdout failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Informational request selected from the resolved arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InfoRequest {
    Version,
    SampleConfig,
    Usage(String),
    MissingConfig,
}

/// Next step of a reload cycle.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Dispatch<'a> {
    /// Serve an informational request and stop.
    Inform(InfoRequest),
    /// Bootstrap from this configuration file.
    Proceed(&'a Path),
}

impl<'a> Dispatch<'a> {
    /// Evaluates version, sample-config, usage and missing config in that
    /// order; the first match wins.
    pub(crate) fn select(args: &'a ResolvedArguments) -> Self {
        if args.version() {
            return Self::Inform(InfoRequest::Version);
        }
        if args.sample_config() {
            return Self::Inform(InfoRequest::SampleConfig);
        }
        if let Some(plugin) = args.usage() {
            return Self::Inform(InfoRequest::Usage(plugin.to_owned()));
        }
        match args.config() {
            Some(path) => Self::Proceed(path),
            None => Self::Inform(InfoRequest::MissingConfig),
        }
    }
}

/// Serves `request`, writing its output to `out`.
pub(crate) fn handle<W: Write + ?Sized>(
    request: &InfoRequest,
    args: &ResolvedArguments,
    registry: &PluginRegistry,
    out: &mut W,
) -> Result<(), InfoError> {
    match request {
        InfoRequest::Version => writeln!(out, "Telegraf - Version {VERSION}")?,
        InfoRequest::SampleConfig => {
            write_sample_config(out, registry, args.input_filters(), args.output_filters())?;
        }
        InfoRequest::Usage(name) => out.write_all(plugin_usage(registry, name)?.as_bytes())?,
        InfoRequest::MissingConfig => {
            writeln!(out, "Usage: Telegraf")?;
            write_flag_defaults(out)?;
        }
    }
    Ok(())
}

/// Usage text of `name` as an input, falling back to an output.
fn plugin_usage(registry: &PluginRegistry, name: &str) -> Result<String, UsageLookupError> {
    let input = match registry.lookup(PluginKind::Input, name) {
        Ok(spec) => return Ok(spec.usage()),
        Err(error) => error,
    };
    registry
        .lookup(PluginKind::Output, name)
        .map(|spec| spec.usage())
        .map_err(|output| UsageLookupError { input, output })
}
