//! The collection engine.

use std::io::Write;
use std::thread;

use sysinfo::{Disks, MINIMUM_CPU_UPDATE_INTERVAL, System};
use telegraf_config::Config;
use tracing::{debug, info};

use crate::AGENT_TARGET;
use crate::error::AgentError;
use crate::inputs::Input;
use crate::outputs::Output;
use crate::sample::Sample;
use crate::settings::AgentSettings;

/// Collection engine built from one configuration.
#[derive(Debug)]
pub struct Agent {
    config: Config,
    settings: AgentSettings,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
}

impl Agent {
    /// Builds an engine for every configured input and output.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnsupportedInput`],
    /// [`AgentError::UnsupportedOutput`] or [`AgentError::InvalidOption`]
    /// when a plugin instance cannot be mapped onto a bundled gatherer or
    /// writer.
    pub fn new(config: Config) -> Result<Self, AgentError> {
        let inputs = config
            .inputs()
            .iter()
            .map(Input::from_instance)
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = config
            .outputs()
            .iter()
            .map(Output::from_instance)
            .collect::<Result<Vec<_>, _>>()?;
        let settings = AgentSettings::from_config(config.agent());
        Ok(Self {
            config,
            settings,
            inputs,
            outputs,
        })
    }

    /// Configuration the engine was built from.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current runtime settings.
    #[must_use]
    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Mutable runtime settings.
    pub fn settings_mut(&mut self) -> &mut AgentSettings {
        &mut self.settings
    }

    /// Gathers once from every input, tagging samples with the host and the
    /// global tags.
    ///
    /// # Errors
    ///
    /// Returns the first [`AgentError::Gather`] raised by an input.
    pub fn gather(&self) -> Result<Vec<Sample>, AgentError> {
        let mut system = System::new_all();
        thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
        system.refresh_all();
        let disks = Disks::new_with_refreshed_list();

        let mut samples = Vec::new();
        for input in &self.inputs {
            let gathered = input.gather(&system, &disks)?;
            if !self.settings.quiet {
                info!(
                    target: AGENT_TARGET,
                    input = input.name(),
                    samples = gathered.len(),
                    "gathered input"
                );
            }
            samples.extend(gathered.into_iter().map(|sample| self.decorate(sample)));
        }
        Ok(samples)
    }

    fn decorate(&self, mut sample: Sample) -> Sample {
        if let Some(host) = &self.settings.hostname {
            sample.insert_tag("host", host);
        }
        for (key, value) in self.config.tags() {
            sample.insert_tag(key, value);
        }
        sample
    }

    /// Runs one collection pass and prints every sample as `> <line>`.
    ///
    /// # Errors
    ///
    /// Returns gather errors unchanged and [`AgentError::Write`] when `out`
    /// rejects a line.
    pub fn test<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<(), AgentError> {
        for sample in self.gather()? {
            if self.settings.debug {
                debug!(target: AGENT_TARGET, sample = %sample, "test sample");
            }
            writeln!(out, "> {sample}").map_err(AgentError::Write)?;
        }
        out.flush().map_err(AgentError::Write)
    }

    /// Opens every output destination.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Connect`] for the first output that fails.
    pub fn connect(&mut self) -> Result<(), AgentError> {
        for output in &mut self.outputs {
            output.connect()?;
            if !self.settings.quiet {
                info!(target: AGENT_TARGET, output = output.name(), "output connected");
            }
        }
        Ok(())
    }
}
