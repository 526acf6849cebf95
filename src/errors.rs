//! Error types for process launching

use std::io;
use thiserror::Error;

/// Result type for launcher operations
pub type Result<T> = std::result::Result<T, SpawnError>;

/// Errors surfaced to the caller of a spawn.
///
/// Telemetry never produces one of these: an unreadable `/proc` entry is
/// reported as a zero reading instead.
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("fork failed for command '{command}': {source}")]
    ForkFailed {
        command: String,
        #[source]
        source: nix::Error,
    },

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("waitpid failed: {0}")]
    Wait(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
