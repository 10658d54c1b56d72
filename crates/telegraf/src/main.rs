//! Telegraf agent entrypoint.
//!
//! Delegates to [`telegraf::run`] with the process arguments and the
//! standard streams. The streams stay unlocked: the stop watcher logs to
//! stderr while the run sequence is still writing.
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    telegraf::run(std::env::args_os(), &mut stdout, &mut stderr)
}
