//! systemd adapter: unit files, `systemctl`, and termination signals in
//! place of a service dispatcher.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use super::{
    RunCallback, SERVICE_TARGET, ServiceControl, ServiceControlError, ServiceError, ServiceHost,
    StopCallback, TerminationSignals, host_callbacks,
};
use crate::arguments::ServiceDescriptor;

const UNIT_DIR: &str = "/etc/systemd/system";

/// Service manager backed by systemd unit files and `systemctl`.
///
/// # Examples
///
/// ```
/// use telegraf::service::SystemdServiceManager;
///
/// let manager = SystemdServiceManager::new()
///     .with_unit_dir("/run/systemd/transient")
///     .with_systemctl("/usr/bin/systemctl");
/// # drop(manager);
/// ```
#[derive(Debug, Clone)]
pub struct SystemdServiceManager {
    unit_dir: PathBuf,
    systemctl: OsString,
    executable: Option<PathBuf>,
}

impl Default for SystemdServiceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemdServiceManager {
    /// Targets `/etc/systemd/system` and the `systemctl` found on `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            unit_dir: PathBuf::from(UNIT_DIR),
            systemctl: OsString::from("systemctl"),
            executable: None,
        }
    }

    /// Writes unit files into `dir` instead.
    #[must_use]
    pub fn with_unit_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.unit_dir = dir.into();
        self
    }

    /// Runs `program` instead of `systemctl`.
    #[must_use]
    pub fn with_systemctl(mut self, program: impl Into<OsString>) -> Self {
        self.systemctl = program.into();
        self
    }

    /// Uses `path` as the service executable instead of the running binary.
    #[must_use]
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    fn unit_path(&self, name: &str) -> PathBuf {
        self.unit_dir.join(format!("{name}.service"))
    }

    fn executable(&self) -> Result<PathBuf, ServiceControlError> {
        match &self.executable {
            Some(path) => Ok(path.clone()),
            None => env::current_exe().map_err(ServiceControlError::CurrentExe),
        }
    }

    fn systemctl(&self, args: &[&str]) -> Result<(), ServiceControlError> {
        let program = self.systemctl.to_string_lossy().into_owned();
        let command = format!("{program} {}", args.join(" "));
        info!(target: SERVICE_TARGET, command = %command, "running service manager command");
        let output = Command::new(&self.systemctl)
            .args(args)
            .output()
            .map_err(|source| ServiceControlError::Spawn { program, source })?;
        if output.status.success() {
            return Ok(());
        }
        Err(ServiceControlError::Exit {
            command,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }
}

impl ServiceControl for SystemdServiceManager {
    fn install(&self, descriptor: &ServiceDescriptor) -> Result<(), ServiceControlError> {
        let executable = self.executable()?;
        let path = self.unit_path(descriptor.name());
        fs::write(&path, render_unit(descriptor, &executable)).map_err(|source| {
            ServiceControlError::WriteUnit {
                path: path.clone(),
                source,
            }
        })?;
        self.systemctl(&["daemon-reload"])?;
        self.systemctl(&["enable", descriptor.name()])
    }

    fn remove(&self, name: &str) -> Result<(), ServiceControlError> {
        self.systemctl(&["disable", name])?;
        let path = self.unit_path(name);
        fs::remove_file(&path).map_err(|source| ServiceControlError::RemoveUnit {
            path: path.clone(),
            source,
        })?;
        self.systemctl(&["daemon-reload"])
    }

    fn start(&self, name: &str) -> Result<(), ServiceControlError> {
        self.systemctl(&["start", name])
    }

    fn stop(&self, name: &str) -> Result<(), ServiceControlError> {
        self.systemctl(&["stop", name])
    }
}

impl ServiceHost for SystemdServiceManager {
    /// systemd has no dispatcher to attach to, so the adapter always wires
    /// stop handling itself.
    fn in_service_mode(&self) -> bool {
        false
    }

    fn run_as_service(
        &self,
        descriptor: &ServiceDescriptor,
        on_run: RunCallback<'_>,
        on_stop: StopCallback,
    ) -> Result<(), ServiceError> {
        info!(
            target: SERVICE_TARGET,
            service = descriptor.name(),
            "running with termination signal handling"
        );
        let signals = TerminationSignals::install()?;
        host_callbacks(Box::new(signals), on_run, on_stop)
    }
}

fn render_unit(descriptor: &ServiceDescriptor, executable: &Path) -> String {
    let mut exec_start = quote_exec_arg(&executable.to_string_lossy());
    for argument in descriptor.arguments() {
        exec_start.push(' ');
        exec_start.push_str(&quote_exec_arg(argument));
    }
    format!(
        "[Unit]\n\
         Description={description}\n\
         After=network-online.target\n\
         Wants=network-online.target\n\
         \n\
         [Service]\n\
         ExecStart={exec_start}\n\
         Restart=on-failure\n\
         \n\
         [Install]\n\
         WantedBy=multi-user.target\n",
        description = descriptor.description(),
    )
}

/// Escapes `%` and `$` specifiers and double-quotes arguments containing
/// whitespace, quotes, backslashes or control characters. Control characters
/// are written as C escapes so an argument stays on the `ExecStart=` line.
fn quote_exec_arg(raw: &str) -> String {
    let escaped = raw.replace('%', "%%").replace('$', "$$");
    if !escaped.contains(|c: char| c.is_whitespace() || c.is_control() || c == '"' || c == '\\')
    {
        return escaped;
    }
    let mut quoted = String::with_capacity(escaped.len() + 2);
    quoted.push('"');
    for c in escaped.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => quoted.push_str(&format!("\\x{:02x}", u32::from(c))),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
