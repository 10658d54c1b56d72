//! Integration tests for the `telegraf` binary entry point.
//!
//! Exercises the informational paths, a one-shot test pass against the
//! bundled engine, the fatal validation path, and termination signals in run
//! mode and during startup.

use std::ffi::OsStr;
use std::fs;
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::{contains, starts_with};
use tempfile::TempDir;

#[test]
fn version_flag_prints_version() {
    let mut command = cargo_bin_cmd!("telegraf");
    command.env("TELEGRAF_LOG", "off").arg("-version");
    command
        .assert()
        .success()
        .stdout(starts_with("Telegraf - Version "));
}

#[test]
fn bare_invocation_prints_usage() {
    let mut command = cargo_bin_cmd!("telegraf");
    command.env("TELEGRAF_LOG", "off");
    command
        .assert()
        .success()
        .stdout(contains("The flags are:").and(contains("-sample-config")));
}

#[test]
fn sample_config_lists_default_plugins() {
    let mut command = cargo_bin_cmd!("telegraf");
    command.env("TELEGRAF_LOG", "off").arg("-sample-config");
    command
        .assert()
        .success()
        .stdout(contains("[[inputs.cpu]]").and(contains("# [[outputs.discard]]")));
}

#[test]
fn test_pass_prints_samples_and_exits() {
    let dir = TempDir::new().expect("temporary directory");
    let config = dir.path().join("telegraf.conf");
    fs::write(
        &config,
        "[agent]\nhostname = \"collector\"\n\n[[inputs.mem]]\n\n[[outputs.discard]]\n",
    )
    .expect("write config");
    let pidfile = dir.path().join("telegraf.pid");

    let mut command = cargo_bin_cmd!("telegraf");
    command
        .env("TELEGRAF_LOG", "off")
        .arg("-config")
        .arg(&config)
        .arg("-test")
        .arg("-pidfile")
        .arg(&pidfile);
    command.assert().success().stdout(contains("> mem,host=collector "));
    assert!(!pidfile.exists());
}

#[test]
fn configuration_without_outputs_is_fatal() {
    let dir = TempDir::new().expect("temporary directory");
    let config = dir.path().join("telegraf.conf");
    fs::write(&config, "[[inputs.mem]]\n").expect("write config");

    let mut command = cargo_bin_cmd!("telegraf");
    command
        .env("TELEGRAF_LOG", "off")
        .arg(format!("-config={}", config.display()));
    command
        .assert()
        .failure()
        .stderr(contains(
            "Error: no outputs found, did you provide a valid config file?",
        ));
}

#[test]
fn unknown_usage_plugin_is_fatal() {
    let mut command = cargo_bin_cmd!("telegraf");
    command.env("TELEGRAF_LOG", "off").args(["-usage", "nope"]);
    command
        .assert()
        .failure()
        .stderr(contains("Input nope not found and Output nope not found"));
}

const RUN_CONFIG: &str = "[[inputs.mem]]\n\n[[outputs.discard]]\n";
const PATIENCE: Duration = Duration::from_secs(20);

fn spawn_agent(args: &[&OsStr]) -> Child {
    Command::new(env!("CARGO_BIN_EXE_telegraf"))
        .env("TELEGRAF_LOG", "info")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn telegraf")
}

fn send_signal(child: &Child, signal: &str) {
    let status = Command::new("kill")
        .arg(format!("-{signal}"))
        .arg(child.id().to_string())
        .status()
        .expect("run kill");
    assert!(status.success(), "kill -{signal} failed");
}

fn wait_for_exit(child: &mut Child) -> ExitStatus {
    let deadline = Instant::now() + PATIENCE;
    loop {
        if let Some(status) = child.try_wait().expect("poll child") {
            return status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            panic!("telegraf did not exit within {PATIENCE:?}");
        }
        thread::sleep(Duration::from_millis(50));
    }
}

#[test]
fn sigterm_in_run_mode_exits_cleanly_with_logging_enabled() {
    let dir = TempDir::new().expect("temporary directory");
    let config = dir.path().join("telegraf.conf");
    fs::write(&config, RUN_CONFIG).expect("write config");
    let pidfile = dir.path().join("telegraf.pid");

    let mut child = spawn_agent(&[
        OsStr::new("-config"),
        config.as_os_str(),
        OsStr::new("-pidfile"),
        pidfile.as_os_str(),
    ]);
    let deadline = Instant::now() + PATIENCE;
    while !pidfile.exists() {
        if Instant::now() >= deadline {
            let _ = child.kill();
            panic!("telegraf never reached run mode");
        }
        thread::sleep(Duration::from_millis(50));
    }
    thread::sleep(Duration::from_millis(250));

    send_signal(&child, "TERM");
    let status = wait_for_exit(&mut child);
    let output = child.wait_with_output().expect("collect output");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(status.success(), "exit status {status:?}; stderr:\n{stderr}");
    assert!(stderr.contains("Hard Shutdown"), "{stderr}");
}

#[test]
fn sigint_during_a_blocked_configuration_load_terminates() {
    let dir = TempDir::new().expect("temporary directory");
    let config = dir.path().join("fifo.conf");
    let made = Command::new("mkfifo")
        .arg(&config)
        .status()
        .expect("run mkfifo");
    assert!(made.success(), "mkfifo failed");

    let mut child = spawn_agent(&[OsStr::new("-config"), config.as_os_str(), OsStr::new("-test")]);
    thread::sleep(Duration::from_millis(500));

    send_signal(&child, "INT");
    let status = wait_for_exit(&mut child);

    assert!(!status.success());
    assert_eq!(status.signal(), Some(2), "exit status {status:?}");
}
