//! CLI error types.

use santa_core::ModelError;
use santa_session::SessionError;
use thiserror::Error;

/// Errors that can occur while driving a game from the terminal.
#[derive(Debug, Error)]
pub enum CliError {
    /// A participant name from the command line was rejected.
    #[error("invalid participant: {0}")]
    Model(#[from] ModelError),

    /// The session rejected an event.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Reading input or writing output failed.
    #[error("terminal i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The off-thread engine task panicked or was cancelled.
    #[error("assignment task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A `--restrict` value that is not `GIVER:RECIPIENT`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected GIVER:RECIPIENT, got {value:?}")]
pub struct ParseRestrictionError {
    /// The rejected argument.
    pub value: String,
}
