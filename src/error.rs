//! Error types for sshebra.

use thiserror::Error;

/// Main error type for sshebra operations.
#[derive(Error, Debug)]
pub enum ShellError {
    /// I/O error on the session stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid session loop transition attempted.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        from: crate::session::SessionState,
        to: crate::session::SessionState,
    },

    /// Input line could not be split into arguments.
    #[error("splitting args: {0}")]
    Tokenize(#[from] shell_words::ParseError),

    /// Transport handshake was malformed.
    #[error("handshake error: {0}")]
    Handshake(String),

    /// Presented key does not map to an identity.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Operation did not complete in time.
    #[error("operation timed out")]
    Timeout,
}

/// Convenience Result type for sshebra operations.
pub type Result<T> = std::result::Result<T, ShellError>;
