//! Command-line parsing.
//!
//! Flags are written in the single-dash long form (`-config c.conf`). Known
//! flag names are rewritten to clap's double-dash form before parsing; every
//! other token is passed through untouched so values that merely look like
//! flags survive. Boolean flags also take an explicit `-flag=true` or
//! `-flag=false`.

use std::ffi::{OsStr, OsString};
use std::io::{self, Write};

use clap::builder::BoolishValueParser;
use clap::{ArgAction, CommandFactory, Parser};

/// Service name used when `-service-name` is absent or empty.
pub const DEFAULT_SERVICE_NAME: &str = "telegraf";
/// Service description used when `-service-desc` is absent or empty.
pub const DEFAULT_SERVICE_DESCRIPTION: &str = "Telegraf data collection service";

/// Flag names accepted in the single-dash form.
///
/// MAINTENANCE: keep in sync with the `long` names declared on [`Cli`].
const KNOWN_FLAGS: &[&str] = &[
    "config",
    "config-directory",
    "configdirectory",
    "input-filter",
    "filter",
    "output-filter",
    "outputfilter",
    "test",
    "debug",
    "quiet",
    "version",
    "sample-config",
    "usage",
    "pidfile",
    "service-name",
    "service-desc",
    "service-install",
    "service-remove",
    "service-start",
    "service-stop",
    "help",
];

/// Raw flag values as typed by the operator.
#[derive(Debug, Default, Parser)]
#[command(
    name = "telegraf",
    about = "Plugin-driven agent for collecting and reporting metrics",
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
pub(crate) struct Cli {
    /// configuration file to load
    #[arg(long = "config")]
    pub(crate) config: Option<String>,
    /// directory containing additional *.conf files
    #[arg(long = "config-directory")]
    pub(crate) config_directory: Option<String>,
    /// directory containing additional *.conf files (deprecated, use -config-directory)
    #[arg(long = "configdirectory")]
    pub(crate) config_directory_legacy: Option<String>,
    /// filter the inputs to enable, separator is :
    #[arg(long = "input-filter")]
    pub(crate) input_filter: Option<String>,
    /// filter the inputs to enable, separator is : (deprecated, use -input-filter)
    #[arg(long = "filter")]
    pub(crate) input_filter_legacy: Option<String>,
    /// filter the outputs to enable, separator is :
    #[arg(long = "output-filter")]
    pub(crate) output_filter: Option<String>,
    /// filter the outputs to enable, separator is : (deprecated, use -output-filter)
    #[arg(long = "outputfilter")]
    pub(crate) output_filter_legacy: Option<String>,
    /// gather metrics, print them out, and exit
    #[arg(
        long = "test",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub(crate) test: bool,
    /// show metrics as they're generated to stdout
    #[arg(
        long = "debug",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub(crate) debug: bool,
    /// run in quiet mode
    #[arg(
        long = "quiet",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub(crate) quiet: bool,
    /// display the version
    #[arg(
        long = "version",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub(crate) version: bool,
    /// print out full sample configuration
    #[arg(
        long = "sample-config",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub(crate) sample_config: bool,
    /// print usage for a plugin, ie, 'telegraf -usage mem'
    #[arg(long = "usage")]
    pub(crate) usage: Option<String>,
    /// file to write our pid to
    #[arg(long = "pidfile")]
    pub(crate) pidfile: Option<String>,
    /// service name
    #[arg(long = "service-name", default_value = DEFAULT_SERVICE_NAME)]
    pub(crate) service_name: String,
    /// service description
    #[arg(long = "service-desc", default_value = DEFAULT_SERVICE_DESCRIPTION)]
    pub(crate) service_desc: String,
    /// install the service
    #[arg(
        long = "service-install",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub(crate) service_install: bool,
    /// remove the service
    #[arg(
        long = "service-remove",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub(crate) service_remove: bool,
    /// start the service
    #[arg(
        long = "service-start",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub(crate) service_start: bool,
    /// stop the service
    #[arg(
        long = "service-stop",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub(crate) service_stop: bool,
    /// print usage and exit
    #[arg(
        long = "help",
        short = 'h',
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub(crate) help: bool,
}

/// Outcome of parsing one argument vector.
#[derive(Debug)]
pub(crate) enum CommandLine {
    /// No flag at all was given.
    Empty,
    /// `-h` or `-help`.
    Help,
    /// The parser rejected the arguments.
    Invalid(clap::Error),
    /// Parsed flag values.
    Parsed(Box<Cli>),
}

/// Parses `args`, the first element being the program name.
pub(crate) fn parse(args: &[OsString]) -> CommandLine {
    if args.len() <= 1 {
        return CommandLine::Empty;
    }
    match Cli::try_parse_from(normalise(args)) {
        Ok(cli) if cli.help => CommandLine::Help,
        Ok(cli) => CommandLine::Parsed(Box::new(cli)),
        Err(error) => CommandLine::Invalid(error),
    }
}

/// Rewrites `-name[=value]` to `--name[=value]` for known flag names.
pub(crate) fn normalise(args: &[OsString]) -> Vec<OsString> {
    let mut normalised = Vec::with_capacity(args.len());
    let mut iter = args.iter();
    if let Some(program) = iter.next() {
        normalised.push(program.clone());
    }
    let mut passthrough = false;
    for arg in iter {
        if passthrough {
            normalised.push(arg.clone());
            continue;
        }
        if arg == OsStr::new("--") {
            passthrough = true;
            normalised.push(arg.clone());
            continue;
        }
        normalised.push(single_dash_to_long(arg).unwrap_or_else(|| arg.clone()));
    }
    normalised
}

fn single_dash_to_long(arg: &OsStr) -> Option<OsString> {
    let text = arg.to_str()?;
    let rest = text.strip_prefix('-')?;
    if rest.starts_with('-') {
        return None;
    }
    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
    KNOWN_FLAGS
        .contains(&name)
        .then(|| OsString::from(format!("-{text}")))
}

/// Writes every flag with its description and non-trivial default, in the
/// layout `-usage` style tools print for a missing configuration.
pub(crate) fn write_flag_defaults<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    let mut command = Cli::command();
    command.build();
    let mut arguments: Vec<_> = command
        .get_arguments()
        .filter_map(|arg| arg.get_long().map(|long| (long, arg)))
        .filter(|(long, _)| *long != "help")
        .collect();
    arguments.sort_by_key(|(long, _)| *long);

    for (long, arg) in arguments {
        let boolean = !arg.get_default_missing_values().is_empty();
        let value = if arg.get_action().takes_values() && !boolean {
            " string"
        } else {
            ""
        };
        writeln!(out, "  -{long}{value}")?;
        let help = arg.get_help().map(ToString::to_string).unwrap_or_default();
        let default = arg
            .get_default_values()
            .first()
            .and_then(|value| value.to_str())
            .filter(|value| !value.is_empty() && *value != "false");
        match default {
            Some(default) => writeln!(out, "    \t{help} (default {default:?})")?,
            None => writeln!(out, "    \t{help}")?,
        }
    }
    Ok(())
}
