//! The command contract.

use async_trait::async_trait;
use thiserror::Error;

use crate::session::SessionContext;

/// What the session loop should do after a command returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading lines.
    Continue,
    /// End the session cleanly.
    Exit,
}

/// Failure reported by a command. Rendered verbatim to the terminal.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Arguments did not match what the command accepts.
    #[error("usage: {0}")]
    Usage(String),

    /// The command ran and failed.
    #[error("{0}")]
    Failed(String),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommandError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }
}

pub type CommandResult = std::result::Result<Outcome, CommandError>;

/// A named unit of behavior exposed to shell clients.
///
/// Implementations receive the session's read-only context and the
/// arguments following the command name. Output goes through
/// [`SessionContext::terminal`].
#[async_trait]
pub trait Command: Send + Sync {
    async fn execute(&self, ctx: &SessionContext, argv: &[String]) -> CommandResult;

    /// One-line description shown by `help`.
    fn summary(&self) -> &str {
        ""
    }
}
