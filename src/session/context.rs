//! Per-session context handed to every command.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::SessionId;
use crate::dispatch::CommandRegistry;
use crate::terminal::{TerminalSize, TerminalWriter, WindowSize};

/// Callback run by the transport when a session's connection is closed.
pub type CloseHook = Box<dyn FnOnce() + Send>;

/// Closes a session's connection exactly once.
///
/// Closing also fires the session's cancellation token, so the loop stops
/// reading from a stream that is going away.
#[derive(Clone)]
pub struct CloseHandle {
    inner: Arc<CloseInner>,
}

struct CloseInner {
    closed: AtomicBool,
    writer: TerminalWriter,
    cancel: CancellationToken,
    hook: Mutex<Option<CloseHook>>,
}

impl CloseHandle {
    pub(crate) fn new(
        writer: TerminalWriter,
        cancel: CancellationToken,
        hook: Option<CloseHook>,
    ) -> Self {
        Self {
            inner: Arc::new(CloseInner {
                closed: AtomicBool::new(false),
                writer,
                cancel,
                hook: Mutex::new(hook),
            }),
        }
    }

    /// Close the connection. Returns `false` if it was already closed.
    pub async fn close(&self) -> bool {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.inner.cancel.cancel();

        if let Err(e) = self.inner.writer.shutdown().await {
            debug!(error = %e, "stream shutdown failed");
        }
        let hook = self.inner.hook.lock().ok().and_then(|mut slot| slot.take());
        if let Some(hook) = hook {
            hook();
        }
        true
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for CloseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseHandle")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Read-only view of a session, built once and passed by reference to
/// every command the session runs.
///
/// Exposes the client identity, the terminal writer, the close callback,
/// and the cancellation trigger. Nothing here can be reassigned; ending
/// the session is requested through [`cancel`](Self::cancel) or
/// [`close`](Self::close).
pub struct SessionContext {
    id: SessionId,
    identity: String,
    terminal: TerminalWriter,
    size: Arc<TerminalSize>,
    close: CloseHandle,
    cancel: CancellationToken,
    registry: Arc<CommandRegistry>,
}

impl SessionContext {
    pub(crate) fn new(
        id: SessionId,
        identity: String,
        terminal: TerminalWriter,
        size: Arc<TerminalSize>,
        close: CloseHandle,
        cancel: CancellationToken,
        registry: Arc<CommandRegistry>,
    ) -> Self {
        Self {
            id,
            identity,
            terminal,
            size,
            close,
            cancel,
            registry,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Identity established by the transport at authentication time.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn terminal(&self) -> &TerminalWriter {
        &self.terminal
    }

    /// Current terminal dimensions.
    pub fn window_size(&self) -> WindowSize {
        self.size.get()
    }

    /// Commands available in this session.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Request the session loop to stop. Safe to call more than once.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token that fires when the session ends, for commands that need to
    /// abandon long-running work.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Close the underlying connection directly.
    pub async fn close(&self) {
        self.close.close().await;
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("id", &self.id)
            .field("identity", &self.identity)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tokio::io::DuplexStream;

    /// Context over an in-memory stream; the returned half sees all output.
    pub(crate) fn test_context(
        identity: &str,
        registry: Arc<CommandRegistry>,
    ) -> (SessionContext, DuplexStream) {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let writer = TerminalWriter::new(server);
        let cancel = CancellationToken::new();
        let close = CloseHandle::new(writer.clone(), cancel.clone(), None);
        let ctx = SessionContext::new(
            SessionId::next(),
            identity.to_string(),
            writer,
            Arc::new(TerminalSize::default()),
            close,
            cancel,
            registry,
        );
        (ctx, client)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::test_context;
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_context_accessors() {
        let (ctx, _client) = test_context("root", CommandRegistry::new().freeze());
        assert_eq!(ctx.identity(), "root");
        assert_eq!(ctx.window_size(), WindowSize::default());
        assert!(ctx.registry().is_empty());
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let (ctx, _client) = test_context("root", CommandRegistry::new().freeze());
        ctx.cancel();
        ctx.cancel();
        assert!(ctx.is_cancelled());
        assert!(ctx.cancellation().is_cancelled());
    }

    #[tokio::test]
    async fn test_close_runs_once() {
        let (client, server) = tokio::io::duplex(1024);
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let cancel = CancellationToken::new();
        let handle = CloseHandle::new(
            TerminalWriter::new(server),
            cancel.clone(),
            Some(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );

        assert!(handle.close().await);
        assert!(!handle.close().await);
        assert!(handle.clone().is_closed());
        assert!(cancel.is_cancelled());
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // Shutdown reached the client as end of stream
        let mut client = client;
        let mut buf = Vec::new();
        client.read_to_end(&mut buf).await.unwrap();
        assert!(buf.is_empty());
    }
}
