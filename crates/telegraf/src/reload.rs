//! The reload loop: one token, one full cycle per arming.

use tracing::debug;

use crate::errors::ControllerError;
use crate::service::RunState;

pub(crate) const RELOAD_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::reload");

/// Single-slot reload request owned by the loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReloadToken {
    armed: bool,
}

impl ReloadToken {
    /// A token already holding one request.
    pub(crate) const fn primed() -> Self {
        Self { armed: true }
    }

    /// Requests another cycle.
    #[cfg_attr(not(test), expect(dead_code, reason = "no reload trigger is wired yet"))]
    pub(crate) fn arm(&mut self) {
        self.armed = true;
    }

    /// Consumes the pending request, if any.
    pub(crate) fn take(&mut self) -> bool {
        std::mem::take(&mut self.armed)
    }
}

/// Runs `cycle` once per arming of a primed token.
///
/// Nothing re-arms the token, so exactly one cycle runs. The state of the
/// last cycle is returned; a failing cycle ends the loop.
pub(crate) fn run_reload_loop<F>(mut cycle: F) -> Result<RunState, ControllerError>
where
    F: FnMut(&mut ReloadToken) -> Result<RunState, ControllerError>,
{
    let mut token = ReloadToken::primed();
    let mut state = RunState::Finished;
    let mut iteration = 0_u32;
    while token.take() {
        iteration += 1;
        debug!(target: RELOAD_TARGET, iteration, "starting cycle");
        state = cycle(&mut token)?;
    }
    debug!(target: RELOAD_TARGET, iterations = iteration, ?state, "reload loop finished");
    Ok(state)
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn take_empties_the_token() {
        let mut token = ReloadToken::primed();
        assert!(token.take());
        assert!(!token.take());
    }

    #[test]
    fn runs_exactly_one_cycle() {
        let mut calls = 0;
        let state = run_reload_loop(|_| {
            calls += 1;
            Ok(RunState::Serving)
        })
        .expect("cycle succeeds");
        assert_eq!(calls, 1);
        assert_eq!(state, RunState::Serving);
    }

    #[test]
    fn rearming_runs_another_cycle() {
        let mut calls = 0;
        let state = run_reload_loop(|token| {
            calls += 1;
            if calls < 3 {
                token.arm();
            }
            Ok(RunState::Finished)
        })
        .expect("cycles succeed");
        assert_eq!(calls, 3);
        assert_eq!(state, RunState::Finished);
    }

    #[test]
    fn failing_cycle_stops_the_loop() {
        let mut calls = 0;
        let result = run_reload_loop(|token| {
            calls += 1;
            token.arm();
            Err(ControllerError::Output(io::Error::other("closed")))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
