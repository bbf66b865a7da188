//! What a transport hands to the shell for each authenticated client.

use std::fmt;

use tokio::sync::mpsc;

use crate::session::CloseHook;
use crate::terminal::WindowSize;

/// Pseudo-terminal negotiated by the client.
pub struct PtyRequest {
    /// Terminal type, e.g. `xterm-256color`.
    pub term: String,
    /// Initial window size.
    pub size: WindowSize,
    /// Window-change notifications; ends when the connection ends.
    pub changes: Option<mpsc::Receiver<WindowSize>>,
}

impl PtyRequest {
    pub fn new(term: impl Into<String>, size: WindowSize) -> Self {
        Self {
            term: term.into(),
            size,
            changes: None,
        }
    }

    /// Attach the source of window-change notifications.
    pub fn with_changes(mut self, changes: mpsc::Receiver<WindowSize>) -> Self {
        self.changes = Some(changes);
        self
    }
}

impl fmt::Debug for PtyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PtyRequest")
            .field("term", &self.term)
            .field("size", &self.size)
            .field("resizable", &self.changes.is_some())
            .finish()
    }
}

/// An authenticated, bidirectional client stream.
pub struct Connection<S> {
    pub(crate) stream: S,
    pub(crate) identity: String,
    pub(crate) raw_command: Option<String>,
    pub(crate) pty: Option<PtyRequest>,
    pub(crate) on_close: Option<CloseHook>,
}

impl<S> Connection<S> {
    /// Wrap a stream whose peer has been authenticated as `identity`.
    pub fn new(stream: S, identity: impl Into<String>) -> Self {
        Self {
            stream,
            identity: identity.into(),
            raw_command: None,
            pty: None,
            on_close: None,
        }
    }

    /// Record a non-interactive command requested at connect time.
    pub fn with_raw_command(mut self, command: impl Into<String>) -> Self {
        let command = command.into();
        self.raw_command = (!command.is_empty()).then_some(command);
        self
    }

    pub fn with_pty(mut self, pty: PtyRequest) -> Self {
        self.pty = Some(pty);
        self
    }

    /// Run `hook` once when the session closes the connection.
    pub fn on_close(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn raw_command(&self) -> Option<&str> {
        self.raw_command.as_deref()
    }

    pub fn pty(&self) -> Option<&PtyRequest> {
        self.pty.as_ref()
    }
}

impl<S> fmt::Debug for Connection<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("identity", &self.identity)
            .field("raw_command", &self.raw_command)
            .field("pty", &self.pty)
            .finish_non_exhaustive()
    }
}
