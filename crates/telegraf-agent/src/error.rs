//! Errors raised by the collection engine.

use std::io;

use thiserror::Error;

/// Errors raised while building, testing or connecting the engine.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The configuration names an input the engine cannot run.
    #[error("engine does not provide input plugin '{name}'")]
    UnsupportedInput {
        /// Plugin name.
        name: String,
    },

    /// The configuration names an output the engine cannot run.
    #[error("engine does not provide output plugin '{name}'")]
    UnsupportedOutput {
        /// Plugin name.
        name: String,
    },

    /// A plugin option has the wrong type.
    #[error("{plugin}: option '{option}' must be {expected}")]
    InvalidOption {
        /// Plugin name.
        plugin: String,
        /// Option key.
        option: &'static str,
        /// Description of the accepted type.
        expected: &'static str,
    },

    /// An input could not produce its measurements.
    #[error("Error gathering input {input}: {reason}")]
    Gather {
        /// Input name.
        input: String,
        /// What went wrong.
        reason: String,
    },

    /// Test output could not be written.
    #[error("failed to write test output: {0}")]
    Write(#[source] io::Error),

    /// An output failed to open its destination.
    #[error("Error connecting to output {output} ({target}): {source}")]
    Connect {
        /// Output name.
        output: String,
        /// Destination that failed.
        target: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}
