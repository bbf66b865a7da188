//! Session bootstrap and the read-eval loop.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::context::{CloseHandle, SessionContext};
use super::resize::spawn_resize_watcher;
use super::{CloseReason, SessionId, SessionState};
use crate::dispatch::{split_command, tokenize, CommandRegistry, Outcome};
use crate::terminal::{prompt_for, Terminal, TerminalSize, TerminalWriter};
use crate::transport::Connection;
use crate::Result;

/// Message written to clients that request a non-interactive command.
pub const RAW_COMMAND_REJECTION: &str = "raw commands are not supported";

/// Serves interactive shell sessions over authenticated connections.
///
/// Cheap to clone; every clone shares the same frozen registry.
#[derive(Debug, Clone)]
pub struct ShellServer {
    registry: Arc<CommandRegistry>,
}

impl ShellServer {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Run one session to completion.
    ///
    /// Called once per accepted connection. The stream is closed on every
    /// exit path before this returns.
    pub async fn handle<S>(&self, conn: Connection<S>) -> CloseReason
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let id = SessionId::next();
        let span = info_span!("session", %id, identity = %conn.identity);
        self.run(id, conn).instrument(span).await
    }

    async fn run<S>(&self, id: SessionId, conn: Connection<S>) -> CloseReason
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let Connection {
            stream,
            identity,
            raw_command,
            pty,
            on_close,
        } = conn;

        let (reader, writer) = tokio::io::split(stream);
        let writer = TerminalWriter::new(writer);
        let cancel = CancellationToken::new();
        let close = CloseHandle::new(writer.clone(), cancel.clone(), on_close);

        if let Some(command) = raw_command {
            warn!(command = %command, "rejecting raw command");
            if let Err(e) = writer.write_line(RAW_COMMAND_REJECTION).await {
                debug!(error = %e, "failed to write rejection");
            }
            close.close().await;
            return CloseReason::Rejected;
        }

        let size = Arc::new(TerminalSize::new(
            pty.as_ref().map(|p| p.size).unwrap_or_default(),
        ));
        let ctx = SessionContext::new(
            id,
            identity.clone(),
            writer.clone(),
            size.clone(),
            close.clone(),
            cancel.clone(),
            self.registry.clone(),
        );
        let mut terminal = Terminal::new(reader, writer.clone(), prompt_for(&identity), size.clone())
            .with_echo(pty.is_some());

        if let Some(pty) = &pty {
            debug!(term = %pty.term, width = pty.size.width, height = pty.size.height, "pty negotiated");
        }
        let watcher = pty
            .and_then(|p| p.changes)
            .map(|changes| spawn_resize_watcher(size, changes, cancel.clone()));

        info!("session opened");
        let reason = match self.serve(&ctx, &mut terminal).await {
            Ok(reason) => reason,
            Err(e) => {
                error!(error = %e, "session failed");
                CloseReason::Error
            }
        };

        cancel.cancel();
        if let Some(watcher) = watcher {
            if let Err(e) = watcher.await {
                warn!(error = %e, "resize watcher failed");
            }
        }
        close.close().await;

        info!(reason = ?reason, "session closed");
        reason
    }

    /// Greet the client, then loop until EOF, error, or cancellation.
    async fn serve<R>(&self, ctx: &SessionContext, terminal: &mut Terminal<R>) -> Result<CloseReason>
    where
        R: AsyncRead + Unpin,
    {
        ctx.terminal()
            .write_line(&format!("hello, {}", ctx.identity()))
            .await?;

        let mut state = SessionState::Reading;
        loop {
            let read = tokio::select! {
                biased;
                _ = ctx.cancellation().cancelled() => None,
                read = terminal.read_line() => Some(read),
            };

            let line = match read {
                Some(Ok(Some(line))) => line,
                Some(Ok(None)) => {
                    let _ = ctx.terminal().write_line("EOF.").await;
                    return finish(&mut state, CloseReason::Eof);
                }
                Some(Err(e)) => {
                    warn!(error = %e, "reading line failed");
                    let _ = ctx
                        .terminal()
                        .write_line(&format!("reading line: {}", e))
                        .await;
                    return finish(&mut state, CloseReason::Error);
                }
                None => return finish(&mut state, CloseReason::Cancelled),
            };

            state.transition_to(SessionState::Tokenizing)?;
            let argv = match tokenize(&line) {
                Ok(argv) => argv,
                Err(e) => {
                    debug!(error = %e, "unparseable line");
                    ctx.terminal().write_line(&e.to_string()).await?;
                    state.transition_to(SessionState::Reading)?;
                    continue;
                }
            };
            let Some((name, args)) = split_command(&argv) else {
                state.transition_to(SessionState::Reading)?;
                continue;
            };

            state.transition_to(SessionState::Dispatching)?;
            let outcome = self.registry.dispatch(ctx, name, args).await?;
            if outcome == Outcome::Exit || ctx.is_cancelled() {
                return finish(&mut state, CloseReason::Cancelled);
            }
            state.transition_to(SessionState::Reading)?;
        }
    }
}

fn finish(state: &mut SessionState, reason: CloseReason) -> Result<CloseReason> {
    state.transition_to(SessionState::Closed(reason))?;
    Ok(reason)
}
