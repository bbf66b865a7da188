//! Line-protocol TCP transport.
//!
//! A client opens a TCP connection and sends a single JSON handshake line:
//!
//! ```text
//! {"key": "<access key>", "command": null, "pty": {"term": "xterm", "width": 120, "height": 40}}
//! ```
//!
//! `command` and `pty` are optional. On success everything after the
//! handshake line is the interactive session; on failure the server writes
//! one error line and closes.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use super::{Connection, KeyStore, PtyRequest};
use crate::error::ShellError;
use crate::session::{CloseReason, ShellServer};
use crate::terminal::WindowSize;
use crate::Result;

/// Default time a client has to send its handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on the handshake line, newline included.
const MAX_HANDSHAKE_LEN: u64 = 4096;

/// First line sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handshake {
    /// Access key, mapped to an identity by the [`KeyStore`].
    pub key: String,
    /// Non-interactive command; always rejected by the shell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Pseudo-terminal request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pty: Option<PtySpec>,
}

/// Pseudo-terminal parameters in a [`Handshake`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtySpec {
    #[serde(default = "default_term")]
    pub term: String,
    pub width: u32,
    pub height: u32,
}

fn default_term() -> String {
    "xterm".to_string()
}

/// Read and parse the handshake line.
pub async fn read_handshake<R>(reader: &mut BufReader<R>) -> Result<Handshake>
where
    R: AsyncRead + Unpin,
{
    let mut line = String::new();
    let n = (&mut *reader)
        .take(MAX_HANDSHAKE_LEN)
        .read_line(&mut line)
        .await?;

    if n == 0 {
        return Err(ShellError::Handshake(
            "connection closed before handshake".into(),
        ));
    }
    if !line.ends_with('\n') {
        return Err(ShellError::Handshake("handshake line too long".into()));
    }
    serde_json::from_str(line.trim_end()).map_err(|e| ShellError::Handshake(e.to_string()))
}

/// Accepts TCP clients, authenticates them, and runs their sessions.
#[derive(Debug, Clone)]
pub struct TcpServer {
    shell: ShellServer,
    keys: Arc<KeyStore>,
    handshake_timeout: Duration,
}

impl TcpServer {
    pub fn new(shell: ShellServer, keys: KeyStore) -> Self {
        Self {
            shell,
            keys: Arc::new(keys),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Accept connections until accepting fails.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        self.serve_with_shutdown(listener, std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves or accepting fails.
    ///
    /// Sessions already running are left to finish on their own.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        if let Ok(addr) = listener.local_addr() {
            info!("Listening for shell clients on {}", addr);
        }
        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down listener");
                    return Ok(());
                }
                accepted = listener.accept() => accepted?,
            };

            let server = self.clone();
            tokio::spawn(async move {
                match server.accept_session(stream, peer).await {
                    Ok(reason) => debug!(%peer, ?reason, "connection finished"),
                    Err(e) => warn!(%peer, error = %e, "connection rejected"),
                }
            });
        }
    }

    async fn accept_session(&self, stream: TcpStream, peer: SocketAddr) -> Result<CloseReason> {
        debug!(%peer, "connection accepted");
        let mut stream = BufReader::new(stream);

        let handshake = tokio::time::timeout(self.handshake_timeout, read_handshake(&mut stream))
            .await
            .map_err(|_| ShellError::Timeout)
            .and_then(|r| r);
        let handshake = match handshake {
            Ok(handshake) => handshake,
            Err(e) => return Err(refuse(&mut stream, e).await),
        };

        let Some(identity) = self.keys.identity_for(&handshake.key) else {
            return Err(refuse(&mut stream, ShellError::AuthenticationFailed).await);
        };
        info!(%peer, identity, "client authenticated");

        let mut conn = Connection::new(stream, identity)
            .on_close(move || debug!(%peer, "connection closed"));
        if let Some(command) = handshake.command {
            conn = conn.with_raw_command(command);
        }
        if let Some(pty) = handshake.pty {
            conn = conn.with_pty(PtyRequest::new(
                pty.term,
                WindowSize::new(pty.width, pty.height),
            ));
        }

        Ok(self.shell.handle(conn).await)
    }
}

/// Tell the client why it is being dropped, then close.
async fn refuse(stream: &mut BufReader<TcpStream>, err: ShellError) -> ShellError {
    let message = format!("{}\r\n", err);
    if stream.write_all(message.as_bytes()).await.is_ok() {
        let _ = stream.shutdown().await;
    }
    err
}
