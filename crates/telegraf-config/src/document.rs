//! Applies one parsed TOML document onto a [`Config`].

use std::path::Path;

use telegraf_plugins::PluginKind;
use toml::{Table, Value};

use crate::config::Config;
use crate::error::ConfigError;
use crate::plugin::PluginInstance;

pub(crate) fn apply(config: &mut Config, path: &Path, contents: &str) -> Result<(), ConfigError> {
    let document: Table = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    for (section, value) in document {
        match section.as_str() {
            "tags" | "global_tags" => apply_tags(config, path, &section, value)?,
            "agent" => config.agent_mut().merge(path, value)?,
            "inputs" => apply_plugins(config, path, PluginKind::Input, value)?,
            "outputs" => apply_plugins(config, path, PluginKind::Output, value)?,
            _ => {
                return Err(ConfigError::UnsupportedSection {
                    path: path.to_path_buf(),
                    section,
                });
            }
        }
    }
    Ok(())
}

fn apply_tags(
    config: &mut Config,
    path: &Path,
    section: &str,
    value: Value,
) -> Result<(), ConfigError> {
    let Value::Table(tags) = value else {
        return Err(invalid(path, section, "must be a table"));
    };
    for (key, value) in tags {
        let Value::String(value) = value else {
            return Err(invalid(path, &format!("{section}.{key}"), "must be a string"));
        };
        config.insert_tag(key, value);
    }
    Ok(())
}

fn apply_plugins(
    config: &mut Config,
    path: &Path,
    kind: PluginKind,
    value: Value,
) -> Result<(), ConfigError> {
    let Value::Table(plugins) = value else {
        return Err(invalid(path, kind.section(), "must be a table"));
    };

    for (name, entry) in plugins {
        if !selected(config, kind, &name) {
            continue;
        }
        if config.registry().get(kind, &name).is_none() {
            return Err(ConfigError::UndefinedPlugin {
                path: path.to_path_buf(),
                kind,
                name,
            });
        }
        for options in instances(path, kind, &name, entry)? {
            let instance = PluginInstance::new(name.clone(), options);
            match kind {
                PluginKind::Input => config.push_input(instance),
                PluginKind::Output => config.push_output(instance),
            }
        }
    }
    Ok(())
}

fn selected(config: &Config, kind: PluginKind, name: &str) -> bool {
    let filters = match kind {
        PluginKind::Input => config.input_filters(),
        PluginKind::Output => config.output_filters(),
    };
    filters.is_empty() || filters.iter().any(|filter| filter == name)
}

fn instances(
    path: &Path,
    kind: PluginKind,
    name: &str,
    entry: Value,
) -> Result<Vec<Table>, ConfigError> {
    let key = || format!("{}.{name}", kind.section());
    match entry {
        Value::Table(options) => Ok(vec![options]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Table(options) => Ok(options),
                _ => Err(invalid(path, &key(), "entries must be tables")),
            })
            .collect(),
        _ => Err(invalid(path, &key(), "must be a table or an array of tables")),
    }
}

fn invalid(path: &Path, section: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidSection {
        path: path.to_path_buf(),
        section: section.to_owned(),
        reason,
    }
}
