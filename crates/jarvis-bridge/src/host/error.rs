//! Host dispatch errors.

use std::process::ExitStatus;

use thiserror::Error;

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

/// Errors raised while dispatching a host action.
#[derive(Debug, Error)]
pub enum HostError {
    /// The program could not be started at all.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A waited-on program finished unsuccessfully.
    #[error("{program} exited with {status}")]
    ExitStatus { program: String, status: ExitStatus },
}

impl HostError {
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }
}
