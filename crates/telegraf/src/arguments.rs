//! Resolution of raw flags into one authoritative option set.

use std::path::{Path, PathBuf};

use crate::cli::{Cli, DEFAULT_SERVICE_DESCRIPTION, DEFAULT_SERVICE_NAME};

/// One-shot service management action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    /// Register the service with the platform manager.
    Install,
    /// Unregister the service.
    Remove,
    /// Ask the manager to start the service.
    Start,
    /// Ask the manager to stop the service.
    Stop,
}

/// The four administrative flags as given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct AdminFlags {
    pub(crate) install: bool,
    pub(crate) remove: bool,
    pub(crate) start: bool,
    pub(crate) stop: bool,
}

impl AdminFlags {
    /// First requested action in the order install, remove, start, stop.
    pub(crate) fn action(self) -> Option<AdminAction> {
        [
            (self.install, AdminAction::Install),
            (self.remove, AdminAction::Remove),
            (self.start, AdminAction::Start),
            (self.stop, AdminAction::Stop),
        ]
        .into_iter()
        .find_map(|(requested, action)| requested.then_some(action))
    }
}

/// Identity of the service as registered with the platform manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    name: String,
    description: String,
    arguments: Vec<String>,
}

impl ServiceDescriptor {
    /// Creates a descriptor; empty fields fall back to the defaults.
    ///
    /// Control characters become spaces, so a name or description can never
    /// span more than one line of a unit file.
    #[must_use]
    pub fn new(name: &str, description: &str, arguments: Vec<String>) -> Self {
        let name = single_line(name);
        let description = single_line(description);
        Self {
            name: non_empty(&name).unwrap_or(DEFAULT_SERVICE_NAME).to_owned(),
            description: non_empty(&description)
                .unwrap_or(DEFAULT_SERVICE_DESCRIPTION)
                .to_owned(),
            arguments,
        }
    }

    /// Service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Arguments the service is launched with.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

impl Default for ServiceDescriptor {
    fn default() -> Self {
        Self::new("", "", Vec::new())
    }
}

/// Option set for one reload cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResolvedArguments {
    config: Option<PathBuf>,
    config_directory_legacy: Option<PathBuf>,
    config_directory: Option<PathBuf>,
    input_filters: Vec<String>,
    output_filters: Vec<String>,
    debug: bool,
    quiet: bool,
    test: bool,
    version: bool,
    sample_config: bool,
    usage: Option<String>,
    pidfile: Option<PathBuf>,
    service: ServiceDescriptor,
    admin: AdminFlags,
}

impl ResolvedArguments {
    pub(crate) fn from_cli(cli: Cli) -> Self {
        let config = non_empty_path(cli.config.as_deref());
        let config_directory_legacy = non_empty_path(cli.config_directory_legacy.as_deref());
        let config_directory = non_empty_path(cli.config_directory.as_deref());
        let input_filters = parse_filter(&prefer_current(
            cli.input_filter.as_deref(),
            cli.input_filter_legacy.as_deref(),
        ));
        let output_filters = parse_filter(&prefer_current(
            cli.output_filter.as_deref(),
            cli.output_filter_legacy.as_deref(),
        ));
        let pidfile = non_empty_path(cli.pidfile.as_deref());

        let mut resolved = Self {
            config,
            config_directory_legacy,
            config_directory,
            input_filters,
            output_filters,
            debug: cli.debug,
            quiet: cli.quiet,
            test: cli.test,
            version: cli.version,
            sample_config: cli.sample_config,
            usage: cli.usage.filter(|name| !name.is_empty()),
            pidfile,
            service: ServiceDescriptor::default(),
            admin: AdminFlags {
                install: cli.service_install,
                remove: cli.service_remove,
                start: cli.service_start,
                stop: cli.service_stop,
            },
        };
        resolved.service = ServiceDescriptor::new(
            &cli.service_name,
            &cli.service_desc,
            resolved.service_arguments(),
        );
        resolved
    }

    /// Arguments a service launch must repeat to reproduce this invocation.
    fn service_arguments(&self) -> Vec<String> {
        let mut arguments = Vec::new();
        let mut push_path = |flag: &str, path: Option<&PathBuf>| {
            if let Some(path) = path {
                let absolute = std::path::absolute(path).unwrap_or_else(|_| path.clone());
                arguments.push(flag.to_owned());
                arguments.push(absolute.to_string_lossy().into_owned());
            }
        };
        push_path("-config", self.config.as_ref());
        push_path("-configdirectory", self.config_directory_legacy.as_ref());
        push_path("-config-directory", self.config_directory.as_ref());
        push_path("-pidfile", self.pidfile.as_ref());
        for (flag, filters) in [
            ("-input-filter", &self.input_filters),
            ("-output-filter", &self.output_filters),
        ] {
            if !filters.is_empty() {
                arguments.push(flag.to_owned());
                arguments.push(filters.join(":"));
            }
        }
        for (flag, set) in [("-debug", self.debug), ("-quiet", self.quiet)] {
            if set {
                arguments.push(flag.to_owned());
            }
        }
        arguments
    }

    pub(crate) fn config(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    /// Supplementary directories in application order: legacy, then current.
    pub(crate) fn config_directories(&self) -> impl Iterator<Item = &Path> {
        [&self.config_directory_legacy, &self.config_directory]
            .into_iter()
            .filter_map(|dir| dir.as_deref())
    }

    pub(crate) fn input_filters(&self) -> &[String] {
        &self.input_filters
    }

    pub(crate) fn output_filters(&self) -> &[String] {
        &self.output_filters
    }

    pub(crate) const fn debug(&self) -> bool {
        self.debug
    }

    pub(crate) const fn quiet(&self) -> bool {
        self.quiet
    }

    pub(crate) const fn test(&self) -> bool {
        self.test
    }

    pub(crate) const fn version(&self) -> bool {
        self.version
    }

    pub(crate) const fn sample_config(&self) -> bool {
        self.sample_config
    }

    pub(crate) fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub(crate) fn pidfile(&self) -> Option<&Path> {
        self.pidfile.as_deref()
    }

    pub(crate) fn service(&self) -> &ServiceDescriptor {
        &self.service
    }

    pub(crate) fn admin_action(&self) -> Option<AdminAction> {
        self.admin.action()
    }
}

/// Picks `current` when it is non-empty after trimming, else `legacy`.
fn prefer_current(current: Option<&str>, legacy: Option<&str>) -> String {
    match current.map(str::trim) {
        Some(current) if !current.is_empty() => current.to_owned(),
        _ => legacy.map(str::trim).unwrap_or_default().to_owned(),
    }
}

/// Splits a colon-delimited filter, dropping empty segments.
fn parse_filter(raw: &str) -> Vec<String> {
    raw.trim()
        .split(':')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

fn single_line(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn non_empty_path(value: Option<&str>) -> Option<PathBuf> {
    value.and_then(non_empty).map(PathBuf::from)
}
