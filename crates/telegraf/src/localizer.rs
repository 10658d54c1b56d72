//! Localised usage text.
//!
//! Usage lines are resolved through an `ortho_config` [`Localizer`] backed by
//! the embedded en-US Fluent catalogue, with hardcoded English fallbacks so
//! the output stays correct if the catalogue fails to load.

use std::io::Write;

use ortho_config::{FluentLocalizer, Localizer, NoOpLocalizer};

/// Embedded en-US Fluent catalogue.
pub(crate) static TELEGRAF_EN_US: &str = include_str!("../locales/en-US/messages.ftl");

type Message = (&'static str, &'static str);

const TITLE: Message = (
    "telegraf-usage-title",
    "Telegraf, The plugin-driven server agent for collecting and reporting metrics.",
);
const HEADING: Message = ("telegraf-usage-heading", "Usage:");
const FLAGS_HEADING: Message = ("telegraf-usage-flags-heading", "The flags are:");
const EXAMPLES_HEADING: Message = ("telegraf-usage-examples-heading", "Examples:");

/// `(flag syntax, message)` rows of the flag table.
///
/// The fallbacks must match `locales/en-US/messages.ftl`; the
/// `fluent_and_fallback_usage_are_identical` test guards against drift.
const FLAGS: &[(&str, Message)] = &[
    ("-config <file>", ("telegraf-flag-config", "configuration file to load")),
    (
        "-config-directory <dir>",
        (
            "telegraf-flag-config-directory",
            "directory containing additional *.conf files",
        ),
    ),
    (
        "-test",
        (
            "telegraf-flag-test",
            "gather metrics once, print them to stdout, and exit",
        ),
    ),
    (
        "-sample-config",
        (
            "telegraf-flag-sample-config",
            "print out full sample configuration to stdout",
        ),
    ),
    (
        "-input-filter <list>",
        (
            "telegraf-flag-input-filter",
            "filter the inputs to enable, separator is :",
        ),
    ),
    (
        "-output-filter <list>",
        (
            "telegraf-flag-output-filter",
            "filter the outputs to enable, separator is :",
        ),
    ),
    (
        "-usage <plugin>",
        (
            "telegraf-flag-usage",
            "print usage for a plugin, ie, 'telegraf -usage mem'",
        ),
    ),
    (
        "-debug",
        (
            "telegraf-flag-debug",
            "print metrics as they're generated to stdout",
        ),
    ),
    ("-quiet", ("telegraf-flag-quiet", "run in quiet mode")),
    ("-version", ("telegraf-flag-version", "print the version to stdout")),
    (
        "-pidfile <file>",
        ("telegraf-flag-pidfile", "file to write the process id to"),
    ),
    (
        "-service-name <name>",
        (
            "telegraf-flag-service-name",
            "service name used by the -service-* flags",
        ),
    ),
    (
        "-service-desc <text>",
        (
            "telegraf-flag-service-desc",
            "service description used by -service-install",
        ),
    ),
    (
        "-service-install",
        (
            "telegraf-flag-service-install",
            "install telegraf as a systemd service",
        ),
    ),
    (
        "-service-remove",
        (
            "telegraf-flag-service-remove",
            "remove the telegraf systemd service",
        ),
    ),
    (
        "-service-start",
        (
            "telegraf-flag-service-start",
            "start the telegraf systemd service",
        ),
    ),
    (
        "-service-stop",
        (
            "telegraf-flag-service-stop",
            "stop the telegraf systemd service",
        ),
    ),
];

/// `(comment message, command)` rows of the examples section.
const EXAMPLES: &[(Message, &str)] = &[
    (
        (
            "telegraf-example-sample-config",
            "# generate a telegraf config file:",
        ),
        "telegraf -sample-config > telegraf.conf",
    ),
    (
        (
            "telegraf-example-filtered-sample",
            "# generate config with only cpu input & file output plugins defined",
        ),
        "telegraf -sample-config -input-filter cpu -output-filter file",
    ),
    (
        (
            "telegraf-example-test",
            "# run a single telegraf collection, outputting metrics to stdout",
        ),
        "telegraf -config telegraf.conf -test",
    ),
    (
        (
            "telegraf-example-run",
            "# run telegraf with all plugins defined in config file",
        ),
        "telegraf -config telegraf.conf",
    ),
    (
        (
            "telegraf-example-filtered-run",
            "# run telegraf, enabling the cpu & memory input, and file output plugins",
        ),
        "telegraf -config telegraf.conf -input-filter cpu:mem -output-filter file",
    ),
    (
        (
            "telegraf-example-install",
            "# install telegraf as a systemd service",
        ),
        "telegraf -service-install -config /etc/telegraf/telegraf.conf",
    ),
];

const FLAG_COLUMN: usize = 24;

fn msg(localizer: &dyn Localizer, entry: &Message) -> String {
    localizer.message(entry.0, None, entry.1)
}

/// Builds the application localizer, falling back to [`NoOpLocalizer`] when
/// the Fluent catalogue cannot be loaded.
pub(crate) fn build_localizer() -> Box<dyn Localizer> {
    match FluentLocalizer::with_en_us_defaults([TELEGRAF_EN_US]) {
        Ok(loc) => Box::new(loc),
        Err(_) => Box::new(NoOpLocalizer),
    }
}

/// Writes the full usage text to `writer`.
///
/// # Errors
///
/// Returns [`std::io::Error`] if writing to the underlying stream fails.
pub(crate) fn write_usage<W: Write + ?Sized>(
    writer: &mut W,
    localizer: &dyn Localizer,
) -> std::io::Result<()> {
    writeln!(writer, "{}\n", msg(localizer, &TITLE))?;
    writeln!(writer, "{}\n", msg(localizer, &HEADING))?;
    writeln!(writer, "  telegraf <flags>\n")?;
    writeln!(writer, "{}\n", msg(localizer, &FLAGS_HEADING))?;
    for (flag, message) in FLAGS {
        writeln!(writer, "  {flag:<FLAG_COLUMN$} {}", msg(localizer, message))?;
    }
    writeln!(writer, "\n{}", msg(localizer, &EXAMPLES_HEADING))?;
    for (comment, command) in EXAMPLES {
        writeln!(writer, "\n  {}\n  {command}", msg(localizer, comment))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(localizer: &dyn Localizer) -> String {
        let mut buf = Vec::new();
        write_usage(&mut buf, localizer).expect("write usage");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn fluent_and_fallback_usage_are_identical() {
        assert_eq!(render(build_localizer().as_ref()), render(&NoOpLocalizer));
    }

    #[test]
    fn usage_lists_every_flag_and_example() {
        let text = render(&NoOpLocalizer);
        assert!(text.starts_with("Telegraf, The plugin-driven server agent"));
        let config_row = format!("  {:<FLAG_COLUMN$} configuration file to load\n", "-config <file>");
        assert!(text.contains(&config_row));
        assert!(text.contains("  -service-stop "));
        assert!(text.contains("  telegraf -config telegraf.conf -test\n"));
    }
}
