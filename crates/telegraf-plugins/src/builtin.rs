//! Plugins bundled with the agent.

use crate::registry::{PluginKind, PluginSpec};

/// Reports CPU utilisation.
pub const CPU: PluginSpec = PluginSpec::new(
    PluginKind::Input,
    "cpu",
    "Read metrics about cpu usage",
    "  ## Whether to report per-cpu stats or not
  percpu = true
  ## Whether to report total system cpu stats or not
  totalcpu = true
",
)
.enabled_by_default();

/// Reports disk capacity per mount point.
pub const DISK: PluginSpec = PluginSpec::new(
    PluginKind::Input,
    "disk",
    "Read metrics about disk usage by mount point",
    "  ## By default, telegraf gathers stats for all mountpoints.
  ## Setting mountpoints will restrict the stats to the specified mountpoints.
  # mount_points = [\"/\"]
",
)
.enabled_by_default();

/// Reports memory usage.
pub const MEM: PluginSpec = PluginSpec::new(
    PluginKind::Input,
    "mem",
    "Read metrics about memory usage",
    "  # no configuration
",
)
.enabled_by_default();

/// Reports load averages and uptime.
pub const SYSTEM: PluginSpec = PluginSpec::new(
    PluginKind::Input,
    "system",
    "Read metrics about system load & uptime",
    "  # no configuration
",
)
.enabled_by_default();

/// Accepts measurements and drops them.
pub const DISCARD: PluginSpec = PluginSpec::new(
    PluginKind::Output,
    "discard",
    "Send metrics to nowhere at all",
    "  # no configuration
",
);

/// Appends measurements to local files or stdout.
pub const FILE: PluginSpec = PluginSpec::new(
    PluginKind::Output,
    "file",
    "Send telegraf metrics to file(s)",
    "  ## Files to write to, \"stdout\" is a specially handled file.
  files = [\"stdout\"]
",
)
.enabled_by_default();

/// Every bundled plugin.
pub const PLUGINS: &[PluginSpec] = &[CPU, DISK, MEM, SYSTEM, DISCARD, FILE];
