//! Renders the annotated configuration printed by `-sample-config`.

use std::io;

use telegraf_plugins::{PluginKind, PluginRegistry, PluginSpec};

const HEADER: &str = r#"# Telegraf configuration

# Telegraf is entirely plugin driven. All metrics are gathered from the
# declared inputs, and sent to the declared outputs.

# Plugins must be declared in here to be active.
# To deactivate a plugin, comment out the name and any variables.

# Use 'telegraf -config telegraf.conf -test' to see what metrics a config
# file would generate.

# Global tags can be specified here in key="value" format.
[tags]
  # dc = "us-east-1" # will tag all metrics with dc=us-east-1
  # rack = "1a"

# Configuration for telegraf agent
[agent]
  ## Default data collection interval for all inputs
  interval = "10s"
  ## Default data flushing interval for all outputs
  flush_interval = "10s"
  ## Run telegraf in debug mode
  debug = false
  ## Run telegraf in quiet mode
  quiet = false
  ## Override default hostname, if empty ask the operating system
  hostname = ""
  ## If set to true, do not set the "host" tag on measurements
  omit_hostname = false

"#;

const OUTPUTS_BANNER: &str = "
###############################################################################
#                                  OUTPUTS                                    #
###############################################################################

";

const INPUTS_BANNER: &str = "
###############################################################################
#                                  INPUTS                                     #
###############################################################################

";

/// Renders the full sample configuration.
///
/// A non-empty filter renders exactly the named plugins the registry knows,
/// in filter order. An empty filter renders every plugin of that kind, with
/// non-default plugins commented out.
///
/// # Examples
///
/// ```
/// use telegraf_config::render_sample_config;
/// use telegraf_plugins::PluginRegistry;
///
/// let text = render_sample_config(&PluginRegistry::builtin(), &["mem".to_owned()], &[]);
/// assert!(text.contains("[[inputs.mem]]"));
/// assert!(!text.contains("[[inputs.cpu]]"));
/// ```
#[must_use]
pub fn render_sample_config(
    registry: &PluginRegistry,
    input_filters: &[String],
    output_filters: &[String],
) -> String {
    let mut text = String::from(HEADER);
    text.push_str(OUTPUTS_BANNER);
    render_kind(&mut text, registry, PluginKind::Output, output_filters);
    text.push_str(INPUTS_BANNER);
    render_kind(&mut text, registry, PluginKind::Input, input_filters);
    text
}

/// Writes [`render_sample_config`] output to `out`.
///
/// # Errors
///
/// Propagates write failures from `out`.
pub fn write_sample_config<W: io::Write + ?Sized>(
    out: &mut W,
    registry: &PluginRegistry,
    input_filters: &[String],
    output_filters: &[String],
) -> io::Result<()> {
    out.write_all(render_sample_config(registry, input_filters, output_filters).as_bytes())
}

fn render_kind(text: &mut String, registry: &PluginRegistry, kind: PluginKind, filters: &[String]) {
    if filters.is_empty() {
        for spec in registry.specs(kind) {
            push_block(text, spec, !spec.is_default());
        }
        return;
    }
    for name in filters {
        if let Some(spec) = registry.get(kind, name) {
            push_block(text, spec, false);
        }
    }
}

fn push_block(text: &mut String, spec: &PluginSpec, commented: bool) {
    let usage = spec.usage();
    if commented {
        for line in usage.lines() {
            text.push_str("# ");
            text.push_str(line);
            text.push('\n');
        }
    } else {
        text.push_str(&usage);
    }
    text.push('\n');
}
