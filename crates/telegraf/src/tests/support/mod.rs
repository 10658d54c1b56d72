//! Test doubles for the controller's collaborators.
//!
//! The service manager pairs a `mockall` mock of the administrative
//! primitives with a host that runs the callback inline. Loader and engine
//! doubles record every call so tests can assert ordering.

use std::cell::{Cell, RefCell, RefMut};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Mutex;

use mockall::mock;
use tempfile::TempDir;
use telegraf_agent::AgentError;
use telegraf_config::{Config, ConfigError};
use telegraf_plugins::PluginRegistry;

use crate::arguments::ServiceDescriptor;
use crate::bootstrap::{BootstrapError, ConfigLoader, FileConfigLoader};
use crate::controller::{Collaborators, IoStreams, run_with};
use crate::launch::{Engine, EngineFactory, RuntimeOverrides};
use crate::reporter::LifecycleReporter;
use crate::service::{
    RunCallback, ServiceControl, ServiceControlError, ServiceError, ServiceHost, StopCallback,
};

mock! {
    pub Control {}
    impl ServiceControl for Control {
        fn install(&self, descriptor: &ServiceDescriptor) -> Result<(), ServiceControlError>;
        fn remove(&self, name: &str) -> Result<(), ServiceControlError>;
        fn start(&self, name: &str) -> Result<(), ServiceControlError>;
        fn stop(&self, name: &str) -> Result<(), ServiceControlError>;
    }
}

/// Service manager whose host runs the callback on the calling thread.
pub(crate) struct TestManager {
    control: RefCell<MockControl>,
    pub(crate) dispatching: bool,
    hosted: Cell<u32>,
    hosted_name: RefCell<Option<String>>,
}

impl TestManager {
    pub(crate) fn new(control: MockControl) -> Self {
        Self {
            control: RefCell::new(control),
            dispatching: false,
            hosted: Cell::new(0),
            hosted_name: RefCell::new(None),
        }
    }

    /// Mock receiving administrative calls, for adding expectations.
    pub(crate) fn control(&self) -> RefMut<'_, MockControl> {
        self.control.borrow_mut()
    }

    pub(crate) fn hosted(&self) -> u32 {
        self.hosted.get()
    }

    pub(crate) fn hosted_name(&self) -> Option<String> {
        self.hosted_name.borrow().clone()
    }
}

impl ServiceControl for TestManager {
    fn install(&self, descriptor: &ServiceDescriptor) -> Result<(), ServiceControlError> {
        self.control.borrow().install(descriptor)
    }

    fn remove(&self, name: &str) -> Result<(), ServiceControlError> {
        self.control.borrow().remove(name)
    }

    fn start(&self, name: &str) -> Result<(), ServiceControlError> {
        self.control.borrow().start(name)
    }

    fn stop(&self, name: &str) -> Result<(), ServiceControlError> {
        self.control.borrow().stop(name)
    }
}

impl ServiceHost for TestManager {
    fn in_service_mode(&self) -> bool {
        self.dispatching
    }

    fn run_as_service(
        &self,
        descriptor: &ServiceDescriptor,
        on_run: RunCallback<'_>,
        _on_stop: StopCallback,
    ) -> Result<(), ServiceError> {
        self.hosted.set(self.hosted.get() + 1);
        *self.hosted_name.borrow_mut() = Some(descriptor.name().to_owned());
        on_run().map_err(|error| ServiceError::Run(Box::new(error)))?;
        Ok(())
    }
}

/// Call received by [`RecordingLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LoaderCall {
    Load {
        path: PathBuf,
        inputs: Vec<String>,
        outputs: Vec<String>,
    },
    Merge(PathBuf),
}

/// Loads real files while recording each call.
pub(crate) struct RecordingLoader {
    inner: FileConfigLoader,
    calls: RefCell<Vec<LoaderCall>>,
}

impl RecordingLoader {
    pub(crate) fn new() -> Self {
        Self {
            inner: FileConfigLoader::new(PluginRegistry::builtin()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<LoaderCall> {
        self.calls.borrow().clone()
    }
}

impl ConfigLoader for RecordingLoader {
    fn load(
        &self,
        path: &Path,
        input_filters: &[String],
        output_filters: &[String],
    ) -> Result<Config, ConfigError> {
        self.calls.borrow_mut().push(LoaderCall::Load {
            path: path.to_path_buf(),
            inputs: input_filters.to_vec(),
            outputs: output_filters.to_vec(),
        });
        self.inner.load(path, input_filters, output_filters)
    }

    fn merge_directory(&self, config: &mut Config, directory: &Path) -> Result<(), ConfigError> {
        self.calls
            .borrow_mut()
            .push(LoaderCall::Merge(directory.to_path_buf()));
        self.inner.merge_directory(config, directory)
    }
}

/// Event recorded by [`RecordingEngines`] and its engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EngineEvent {
    Built { inputs: usize, outputs: usize },
    Overrides(RuntimeOverrides),
    Tested,
    Connected,
}

type EngineLog = Rc<RefCell<Vec<EngineEvent>>>;

/// Engine factory producing [`FakeEngine`]s that share one event log.
#[derive(Default)]
pub(crate) struct RecordingEngines {
    log: EngineLog,
    pub(crate) fail_connect: bool,
}

impl RecordingEngines {
    pub(crate) fn events(&self) -> Vec<EngineEvent> {
        self.log.borrow().clone()
    }
}

impl EngineFactory for RecordingEngines {
    fn build(&self, config: Config) -> Result<Box<dyn Engine>, AgentError> {
        self.log.borrow_mut().push(EngineEvent::Built {
            inputs: config.inputs().len(),
            outputs: config.outputs().len(),
        });
        Ok(Box::new(FakeEngine {
            config,
            log: Rc::clone(&self.log),
            fail_connect: self.fail_connect,
        }))
    }
}

struct FakeEngine {
    config: Config,
    log: EngineLog,
    fail_connect: bool,
}

impl Engine for FakeEngine {
    fn config(&self) -> &Config {
        &self.config
    }

    fn apply_overrides(&mut self, overrides: RuntimeOverrides) {
        self.log.borrow_mut().push(EngineEvent::Overrides(overrides));
    }

    fn test(&mut self, out: &mut dyn Write) -> Result<(), AgentError> {
        self.log.borrow_mut().push(EngineEvent::Tested);
        writeln!(out, "> fake,host=test value=1").map_err(AgentError::Write)
    }

    fn connect(&mut self) -> Result<(), AgentError> {
        if self.fail_connect {
            return Err(AgentError::UnsupportedOutput {
                name: "fake".to_owned(),
            });
        }
        self.log.borrow_mut().push(EngineEvent::Connected);
        Ok(())
    }
}

/// Reporter keeping a readable trace of lifecycle events.
#[derive(Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn push(&self, event: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl LifecycleReporter for RecordingReporter {
    fn bootstrap_starting(&self, config_path: &Path) {
        self.push(format!("bootstrap_starting {}", config_path.display()));
    }

    fn directory_merged(&self, directory: &Path) {
        self.push(format!("directory_merged {}", directory.display()));
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.push("bootstrap_succeeded".to_owned());
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.push(format!("bootstrap_failed {error}"));
    }

    fn test_pass_completed(&self) {
        self.push("test_pass_completed".to_owned());
    }

    fn engine_started(&self, version: &str, _config: &Config) {
        self.push(format!("engine_started {version}"));
    }

    fn pidfile_written(&self, path: &Path, pid: u32) {
        self.push(format!("pidfile_written {} {pid}", path.display()));
    }
}

/// Primary configuration with one input and one output.
pub(crate) const COMPLETE_CONFIG: &str = "\
[agent]
interval = \"10s\"
hostname = \"test-host\"

[[inputs.cpu]]

[[outputs.discard]]
";

/// Primary configuration without any output.
pub(crate) const INPUTS_ONLY_CONFIG: &str = "[[inputs.cpu]]\n";

/// Captured outcome of one controller run.
pub(crate) struct Outcome {
    pub(crate) exit: ExitCode,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

/// Collaborators and a scratch directory for one controller run.
pub(crate) struct Harness {
    pub(crate) dir: TempDir,
    pub(crate) loader: RecordingLoader,
    pub(crate) engines: RecordingEngines,
    pub(crate) reporter: RecordingReporter,
    pub(crate) registry: PluginRegistry,
    pub(crate) manager: TestManager,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_control(MockControl::new())
    }

    pub(crate) fn with_control(control: MockControl) -> Self {
        Self {
            dir: TempDir::new().expect("temporary directory"),
            loader: RecordingLoader::new(),
            engines: RecordingEngines::default(),
            reporter: RecordingReporter::default(),
            registry: PluginRegistry::builtin(),
            manager: TestManager::new(control),
        }
    }

    /// Writes `contents` to `name` inside the scratch directory.
    pub(crate) fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    pub(crate) fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Runs the controller with `args`; `{dir}` expands to the scratch
    /// directory.
    pub(crate) fn run(&self, args: &[&str]) -> Outcome {
        let root = self.dir.path().display().to_string();
        let mut argv = vec![OsString::from("telegraf")];
        argv.extend(args.iter().map(|arg| OsString::from(arg.replace("{dir}", &root))));

        let deps = Collaborators {
            loader: &self.loader,
            engines: &self.engines,
            reporter: &self.reporter,
            registry: &self.registry,
            manager: &self.manager,
        };
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let exit = {
            let mut io = IoStreams::new(&mut stdout, &mut stderr);
            run_with(&argv, deps, &mut io)
        };
        Outcome {
            exit,
            stdout: String::from_utf8(stdout).expect("stdout utf8"),
            stderr: String::from_utf8(stderr).expect("stderr utf8"),
        }
    }
}
