//! Behavioural scenarios for startup orchestration.
//!
//! Steps map `tests/features/startup.feature` onto a [`Harness`] whose
//! collaborators record every call.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::process::ExitCode;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use super::support::{
    COMPLETE_CONFIG, EngineEvent, Harness, INPUTS_ONLY_CONFIG, LoaderCall, Outcome,
};
use crate::info::VERSION;
use crate::service::ServiceControlError;

struct StartupWorld {
    harness: Harness,
    outcome: RefCell<Option<Outcome>>,
}

impl StartupWorld {
    fn run(&self, args: &[&str]) {
        let outcome = self.harness.run(args);
        *self.outcome.borrow_mut() = Some(outcome);
    }

    fn with_outcome<T>(&self, check: impl FnOnce(&Outcome) -> T) -> T {
        match self.outcome.borrow().as_ref() {
            Some(outcome) => check(outcome),
            None => panic!("telegraf has not been run"),
        }
    }
}

#[fixture]
fn world() -> StartupWorld {
    StartupWorld {
        harness: Harness::new(),
        outcome: RefCell::new(None),
    }
}

#[given("a configuration with one input and one output")]
fn given_complete_config(world: &StartupWorld) {
    world.harness.write("telegraf.conf", COMPLETE_CONFIG);
}

#[given("a configuration with inputs only")]
fn given_inputs_only(world: &StartupWorld) {
    world.harness.write("telegraf.conf", INPUTS_ONLY_CONFIG);
}

#[given("the directory \"{directory}\" adds input \"{input}\"")]
fn given_directory_input(world: &StartupWorld, directory: String, input: String) {
    let name = format!("{directory}/10-{input}.conf");
    world.harness.write(&name, &format!("[[inputs.{input}]]\n"));
}

#[given("the service manager accepts installs")]
fn given_install_accepted(world: &StartupWorld) {
    world
        .harness
        .manager
        .control()
        .expect_install()
        .once()
        .returning(|_| Ok(()));
}

#[given("the service manager fails to start services")]
fn given_start_fails(world: &StartupWorld) {
    world
        .harness
        .manager
        .control()
        .expect_start()
        .once()
        .returning(|_| {
            Err(ServiceControlError::Spawn {
                program: "systemctl".to_owned(),
                source: io::Error::other("not found"),
            })
        });
}

#[when("telegraf runs with \"{args}\"")]
fn when_runs_with(world: &StartupWorld, args: String) {
    let args: Vec<&str> = args.split_whitespace().collect();
    world.run(&args);
}

#[when("telegraf runs without arguments")]
fn when_runs_bare(world: &StartupWorld) {
    world.run(&[]);
}

#[then("the exit status is success")]
fn then_success(world: &StartupWorld) {
    world.with_outcome(|outcome| {
        assert_eq!(outcome.exit, ExitCode::SUCCESS, "stderr: {}", outcome.stderr);
    });
}

#[then("the exit status is failure")]
fn then_failure(world: &StartupWorld) {
    world.with_outcome(|outcome| assert_eq!(outcome.exit, ExitCode::FAILURE));
}

#[then("stdout is the version line")]
fn then_version_line(world: &StartupWorld) {
    world.with_outcome(|outcome| {
        assert_eq!(outcome.stdout, format!("Telegraf - Version {VERSION}\n"));
    });
}

#[then("stdout contains \"{text}\"")]
fn then_stdout_contains(world: &StartupWorld, text: String) {
    world.with_outcome(|outcome| {
        assert!(outcome.stdout.contains(&text), "stdout: {}", outcome.stdout);
    });
}

#[then("stderr contains \"{text}\"")]
fn then_stderr_contains(world: &StartupWorld, text: String) {
    world.with_outcome(|outcome| {
        assert!(outcome.stderr.contains(&text), "stderr: {}", outcome.stderr);
    });
}

#[then("no configuration was loaded")]
fn then_nothing_loaded(world: &StartupWorld) {
    assert!(world.harness.loader.calls().is_empty());
}

#[then("no pidfile was written")]
fn then_no_pidfile(world: &StartupWorld) {
    assert!(!world.harness.path("telegraf.pid").exists());
}

#[then("the pidfile holds this process id")]
fn then_pidfile_written(world: &StartupWorld) {
    let contents = fs::read_to_string(world.harness.path("telegraf.pid")).expect("pidfile");
    assert_eq!(contents, format!("{}\n", std::process::id()));
}

#[then("the engine connected its outputs")]
fn then_connected(world: &StartupWorld) {
    assert!(world.harness.engines.events().contains(&EngineEvent::Connected));
}

#[then("no engine was built")]
fn then_no_engine(world: &StartupWorld) {
    assert!(world.harness.engines.events().is_empty());
}

#[then("the configuration was loaded with input filter \"{filter}\"")]
fn then_input_filter(world: &StartupWorld, filter: String) {
    let calls = world.harness.loader.calls();
    let Some(LoaderCall::Load { inputs, .. }) = calls.first() else {
        panic!("configuration was not loaded");
    };
    assert_eq!(inputs, &vec![filter]);
}

#[then("directories were merged in the order \"{order}\"")]
fn then_merge_order(world: &StartupWorld, order: String) {
    let merged: Vec<String> = world
        .harness
        .loader
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            LoaderCall::Merge(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            LoaderCall::Load { .. } => None,
        })
        .collect();
    assert_eq!(merged.join(" "), order);
}

#[scenario(
    path = "tests/features/startup.feature",
    name = "Version is reported without reading configuration"
)]
fn version_skips_configuration(#[from(world)] world: StartupWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/startup.feature",
    name = "A test pass prints samples and skips the pidfile"
)]
fn test_pass_skips_pidfile(#[from(world)] world: StartupWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/startup.feature",
    name = "Run mode writes the pidfile after connecting"
)]
fn run_mode_writes_pidfile(#[from(world)] world: StartupWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/startup.feature",
    name = "A configuration without outputs is rejected before connecting"
)]
fn missing_outputs_rejected(#[from(world)] world: StartupWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/startup.feature",
    name = "The current input filter overrides the legacy spelling"
)]
fn current_filter_wins(#[from(world)] world: StartupWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/startup.feature",
    name = "Running without flags prints usage"
)]
fn bare_invocation_prints_usage(#[from(world)] world: StartupWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/startup.feature",
    name = "Supplementary directories merge legacy first"
)]
fn directories_merge_legacy_first(#[from(world)] world: StartupWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/startup.feature",
    name = "Installing the service prints Done"
)]
fn install_prints_done(#[from(world)] world: StartupWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/startup.feature",
    name = "A failing start names the action"
)]
fn failing_start_is_named(#[from(world)] world: StartupWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/startup.feature",
    name = "Plugin usage falls back to outputs"
)]
fn usage_falls_back_to_outputs(#[from(world)] world: StartupWorld) {
    let _ = world;
}
