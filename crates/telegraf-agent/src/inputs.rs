//! Built-in gatherers backed by `sysinfo`.

use std::path::Path;

use sysinfo::{Disks, System};
use telegraf_config::PluginInstance;
use toml::Value;

use crate::error::AgentError;
use crate::sample::Sample;

/// A configured input resolved to one of the bundled gatherers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Input {
    Cpu { per_cpu: bool, total_cpu: bool },
    Disk { mount_points: Vec<String> },
    Mem,
    System,
}

impl Input {
    pub(crate) fn from_instance(instance: &PluginInstance) -> Result<Self, AgentError> {
        match instance.name() {
            "cpu" => Ok(Self::Cpu {
                per_cpu: bool_option(instance, "percpu", true)?,
                total_cpu: bool_option(instance, "totalcpu", true)?,
            }),
            "disk" => Ok(Self::Disk {
                mount_points: string_list_option(instance, "mount_points")?,
            }),
            "mem" => Ok(Self::Mem),
            "system" => Ok(Self::System),
            other => Err(AgentError::UnsupportedInput {
                name: other.to_owned(),
            }),
        }
    }

    pub(crate) const fn name(&self) -> &'static str {
        match self {
            Self::Cpu { .. } => "cpu",
            Self::Disk { .. } => "disk",
            Self::Mem => "mem",
            Self::System => "system",
        }
    }

    pub(crate) fn gather(&self, system: &System, disks: &Disks) -> Result<Vec<Sample>, AgentError> {
        match self {
            Self::Cpu { per_cpu, total_cpu } => Ok(gather_cpu(system, *per_cpu, *total_cpu)),
            Self::Disk { mount_points } => gather_disk(disks, mount_points),
            Self::Mem => Ok(vec![gather_mem(system)]),
            Self::System => Ok(vec![gather_system(system)]),
        }
    }
}

fn gather_cpu(system: &System, per_cpu: bool, total_cpu: bool) -> Vec<Sample> {
    let cpus = system.cpus();
    let mut samples = Vec::new();
    if per_cpu {
        for (index, cpu) in cpus.iter().enumerate() {
            samples.push(
                Sample::new("cpu")
                    .tag("cpu", format!("cpu{index}"))
                    .field("usage_percent", f64::from(cpu.cpu_usage())),
            );
        }
    }
    if total_cpu {
        let total: f32 = cpus.iter().map(sysinfo::Cpu::cpu_usage).sum();
        let average = if cpus.is_empty() {
            0.0
        } else {
            f64::from(total) / cpus.len() as f64
        };
        samples.push(
            Sample::new("cpu")
                .tag("cpu", "cpu-total")
                .field("usage_percent", average),
        );
    }
    samples
}

fn gather_disk(disks: &Disks, mount_points: &[String]) -> Result<Vec<Sample>, AgentError> {
    for wanted in mount_points {
        let mounted = disks
            .list()
            .iter()
            .any(|disk| disk.mount_point() == Path::new(wanted));
        if !mounted {
            return Err(AgentError::Gather {
                input: "disk".to_owned(),
                reason: format!("no disk mounted at {wanted}"),
            });
        }
    }

    let selected = disks.list().iter().filter(|disk| {
        mount_points.is_empty()
            || mount_points
                .iter()
                .any(|wanted| disk.mount_point() == Path::new(wanted))
    });
    Ok(selected
        .map(|disk| {
            let total = disk.total_space();
            let free = disk.available_space();
            let used = total.saturating_sub(free);
            Sample::new("disk")
                .tag("path", disk.mount_point().display().to_string())
                .field("total", total as f64)
                .field("free", free as f64)
                .field("used", used as f64)
                .field("used_percent", percent(used, total))
        })
        .collect())
}

fn gather_mem(system: &System) -> Sample {
    let total = system.total_memory();
    let used = system.used_memory();
    Sample::new("mem")
        .field("total", total as f64)
        .field("used", used as f64)
        .field("available", system.available_memory() as f64)
        .field("used_percent", percent(used, total))
}

fn gather_system(system: &System) -> Sample {
    let load = System::load_average();
    Sample::new("system")
        .field("load1", load.one)
        .field("load5", load.five)
        .field("load15", load.fifteen)
        .field("n_cpus", system.cpus().len() as f64)
        .field("uptime", System::uptime() as f64)
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn bool_option(instance: &PluginInstance, key: &'static str, default: bool) -> Result<bool, AgentError> {
    match instance.options().get(key) {
        None => Ok(default),
        Some(Value::Boolean(value)) => Ok(*value),
        Some(_) => Err(invalid_option(instance, key, "a boolean")),
    }
}

pub(crate) fn string_list_option(
    instance: &PluginInstance,
    key: &'static str,
) -> Result<Vec<String>, AgentError> {
    let Some(value) = instance.options().get(key) else {
        return Ok(Vec::new());
    };
    let Value::Array(items) = value else {
        return Err(invalid_option(instance, key, "an array of strings"));
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(text) => Ok(text.clone()),
            _ => Err(invalid_option(instance, key, "an array of strings")),
        })
        .collect()
}

fn invalid_option(instance: &PluginInstance, option: &'static str, expected: &'static str) -> AgentError {
    AgentError::InvalidOption {
        plugin: instance.name().to_owned(),
        option,
        expected,
    }
}
