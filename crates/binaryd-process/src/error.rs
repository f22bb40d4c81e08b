//! Error types for command execution

use std::io;
use thiserror::Error;

/// Errors raised inside the execution core.
///
/// `execute` never returns these to its caller; they are folded into a
/// [`CommandResult`](crate::CommandResult). They surface only from
/// constructors and internal helpers.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The command specification is unusable
    #[error("Invalid command specification: {0}")]
    InvalidSpec(String),

    /// The command line could not be split into words
    #[error("{0}")]
    Tokenize(String),

    /// Failed to signal the process group
    #[error("Failed to kill process group {pgid}: {reason}")]
    KillFailed { pgid: u32, reason: String },

    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result type for process operations
pub type Result<T> = std::result::Result<T, ProcessError>;
