//! Shared output handle for a session's terminal.

use std::fmt;
use std::io;
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Cloneable writer for the session's terminal.
///
/// Every clone writes to the same underlying stream. Text written through
/// [`write_str`](Self::write_str) has bare `\n` translated to `\r\n`, since
/// a client terminal in raw mode will not do it for us.
#[derive(Clone)]
pub struct TerminalWriter {
    inner: Arc<Mutex<BoxedWriter>>,
}

impl TerminalWriter {
    /// Wrap the write side of a session stream.
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Write text, translating line endings.
    pub async fn write_str(&self, text: &str) -> io::Result<()> {
        self.write_raw(&to_crlf(text)).await
    }

    /// Write text followed by a newline.
    pub async fn write_line(&self, text: &str) -> io::Result<()> {
        let mut bytes = to_crlf(text);
        bytes.extend_from_slice(b"\r\n");
        self.write_raw(&bytes).await
    }

    /// Write bytes exactly as given.
    pub async fn write_raw(&self, bytes: &[u8]) -> io::Result<()> {
        let mut writer = self.inner.lock().await;
        writer.write_all(bytes).await?;
        writer.flush().await
    }

    /// Shut down the write side of the stream.
    pub(crate) async fn shutdown(&self) -> io::Result<()> {
        self.inner.lock().await.shutdown().await
    }
}

impl fmt::Debug for TerminalWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalWriter").finish_non_exhaustive()
    }
}

fn to_crlf(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 8);
    let mut prev = 0u8;
    for &byte in text.as_bytes() {
        if byte == b'\n' && prev != b'\r' {
            out.push(b'\r');
        }
        out.push(byte);
        prev = byte;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_crlf() {
        assert_eq!(to_crlf("a\nb"), b"a\r\nb");
        assert_eq!(to_crlf("a\r\nb"), b"a\r\nb");
        assert_eq!(to_crlf("plain"), b"plain");
        assert_eq!(to_crlf("\n\n"), b"\r\n\r\n");
    }

    #[tokio::test]
    async fn test_write_line_translates() {
        let mock = tokio_test::io::Builder::new().write(b"one\r\ntwo\r\n").build();
        let writer = TerminalWriter::new(mock);
        writer.write_line("one\ntwo").await.unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_stream() {
        let mock = tokio_test::io::Builder::new()
            .write(b"first\r\n")
            .write(b"second\r\n")
            .build();
        let writer = TerminalWriter::new(mock);
        let other = writer.clone();
        writer.write_line("first").await.unwrap();
        other.write_str("second\n").await.unwrap();
    }
}
