//! Built-in writers.

use std::fs::{File, OpenOptions};

use telegraf_config::PluginInstance;

use crate::error::AgentError;
use crate::inputs::string_list_option;

const STDOUT: &str = "stdout";

/// A configured output resolved to one of the bundled writers.
#[derive(Debug)]
pub(crate) enum Output {
    File { files: Vec<String>, handles: Vec<File> },
    Discard,
}

impl Output {
    pub(crate) fn from_instance(instance: &PluginInstance) -> Result<Self, AgentError> {
        match instance.name() {
            "file" => {
                let mut files = string_list_option(instance, "files")?;
                if files.is_empty() {
                    files.push(STDOUT.to_owned());
                }
                Ok(Self::File {
                    files,
                    handles: Vec::new(),
                })
            }
            "discard" => Ok(Self::Discard),
            other => Err(AgentError::UnsupportedOutput {
                name: other.to_owned(),
            }),
        }
    }

    pub(crate) const fn name(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::Discard => "discard",
        }
    }

    /// Opens every destination; files are created when missing and appended
    /// to otherwise. `stdout` needs no handle.
    pub(crate) fn connect(&mut self) -> Result<(), AgentError> {
        let Self::File { files, handles } = self else {
            return Ok(());
        };
        let mut opened = Vec::with_capacity(files.len());
        for target in files.iter().filter(|target| *target != STDOUT) {
            let handle = OpenOptions::new()
                .create(true)
                .append(true)
                .open(target)
                .map_err(|source| AgentError::Connect {
                    output: "file".to_owned(),
                    target: target.clone(),
                    source,
                })?;
            opened.push(handle);
        }
        *handles = opened;
        Ok(())
    }
}
