//! Line editor: turns a raw client byte stream into prompted input lines.

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use super::{TerminalSize, TerminalWriter, WindowSize};

const READ_BUFFER_SIZE: usize = 1024;

/// Decoded keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Char(char),
    Enter,
    Backspace,
    Interrupt,
    EndOfInput,
    ClearLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    Esc,
    Csi,
}

/// Terminal adapter over the read side of a session stream.
///
/// Renders the prompt, collects a line with basic editing (backspace,
/// Ctrl-U, Ctrl-C, Ctrl-D on an empty line), and echoes input when the
/// client negotiated a pseudo-terminal. Escape sequences such as arrow
/// keys are swallowed.
pub struct Terminal<R> {
    reader: R,
    out: TerminalWriter,
    prompt: String,
    prompt_width: usize,
    size: Arc<TerminalSize>,
    echo: bool,
    line: String,
    buf: Box<[u8]>,
    start: usize,
    end: usize,
    utf8: Vec<u8>,
    escape: Escape,
    skip_lf: bool,
}

impl<R: AsyncRead + Unpin> Terminal<R> {
    pub fn new(
        reader: R,
        out: TerminalWriter,
        prompt: impl Into<String>,
        size: Arc<TerminalSize>,
    ) -> Self {
        let prompt = prompt.into();
        Self {
            reader,
            out,
            prompt_width: prompt.chars().count(),
            prompt,
            size,
            echo: false,
            line: String::new(),
            buf: vec![0u8; READ_BUFFER_SIZE].into_boxed_slice(),
            start: 0,
            end: 0,
            utf8: Vec::with_capacity(4),
            escape: Escape::None,
            skip_lf: false,
        }
    }

    /// Echo typed characters back to the client.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn size(&self) -> WindowSize {
        self.size.get()
    }

    /// Render the prompt and read one line.
    ///
    /// Returns `Ok(None)` once the client has ended its input. A partial
    /// line pending at end of input is returned first.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        self.out.write_str(&self.prompt).await?;
        self.line.clear();

        loop {
            let Some(byte) = self.next_byte().await? else {
                if self.line.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(std::mem::take(&mut self.line)));
            };

            let Some(key) = self.decode(byte) else {
                continue;
            };
            trace!(?key, "key");

            match key {
                Key::Char(c) => {
                    self.line.push(c);
                    if self.echo {
                        self.echo_char(c).await?;
                    }
                }
                Key::Enter => {
                    if self.echo {
                        self.out.write_raw(b"\r\n").await?;
                    }
                    return Ok(Some(std::mem::take(&mut self.line)));
                }
                Key::Backspace => {
                    if self.line.pop().is_some() && self.echo {
                        self.erase_char().await?;
                    }
                }
                Key::ClearLine => {
                    while self.line.pop().is_some() {
                        if self.echo {
                            self.erase_char().await?;
                        }
                    }
                }
                Key::Interrupt => {
                    self.line.clear();
                    if self.echo {
                        self.out.write_raw(b"^C\r\n").await?;
                    }
                    return Ok(Some(String::new()));
                }
                Key::EndOfInput => {
                    if self.line.is_empty() {
                        return Ok(None);
                    }
                }
            }
        }
    }

    async fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if self.start == self.end {
            let n = self.reader.read(&mut self.buf).await?;
            if n == 0 {
                return Ok(None);
            }
            self.start = 0;
            self.end = n;
        }
        let byte = self.buf[self.start];
        self.start += 1;
        Ok(Some(byte))
    }

    fn decode(&mut self, byte: u8) -> Option<Key> {
        // A pending multi-byte sequence broken by a non-continuation byte
        // is dropped; the byte itself starts fresh.
        if !self.utf8.is_empty() && !is_continuation(byte) {
            trace!(dropped = ?self.utf8, "invalid utf-8 sequence");
            self.utf8.clear();
        }

        match self.escape {
            Escape::Esc => {
                self.escape = if byte == b'[' || byte == b'O' {
                    Escape::Csi
                } else {
                    Escape::None
                };
                return None;
            }
            Escape::Csi => {
                if (0x40..=0x7e).contains(&byte) {
                    self.escape = Escape::None;
                }
                return None;
            }
            Escape::None => {}
        }

        if std::mem::take(&mut self.skip_lf) && byte == b'\n' {
            return None;
        }

        match byte {
            b'\r' => {
                self.skip_lf = true;
                Some(Key::Enter)
            }
            b'\n' => Some(Key::Enter),
            b'\t' => Some(Key::Char('\t')),
            0x7f | 0x08 => Some(Key::Backspace),
            0x03 => Some(Key::Interrupt),
            0x04 => Some(Key::EndOfInput),
            0x15 => Some(Key::ClearLine),
            0x1b => {
                self.escape = Escape::Esc;
                None
            }
            b if b < 0x20 => None,
            b => self.decode_utf8(b),
        }
    }

    fn decode_utf8(&mut self, byte: u8) -> Option<Key> {
        self.utf8.push(byte);
        match std::str::from_utf8(&self.utf8) {
            Ok(s) => {
                let c = s.chars().next();
                self.utf8.clear();
                c.map(Key::Char)
            }
            // Incomplete multi-byte sequence, wait for the rest
            Err(e) if e.error_len().is_none() => None,
            Err(_) => {
                self.utf8.clear();
                None
            }
        }
    }

    fn cursor(&self) -> usize {
        self.prompt_width + self.line.chars().count()
    }

    async fn echo_char(&mut self, c: char) -> io::Result<()> {
        let mut encoded = [0u8; 4];
        self.out.write_raw(c.encode_utf8(&mut encoded).as_bytes()).await?;

        let width = self.size.width() as usize;
        if width > 0 && self.cursor() % width == 0 {
            self.out.write_raw(b"\r\n").await?;
        }
        Ok(())
    }

    /// Erase the character just popped from the line.
    async fn erase_char(&mut self) -> io::Result<()> {
        let width = self.size.width() as usize;
        let before = self.cursor() + 1;
        if width > 0 && before % width == 0 {
            // The cursor sits at the start of a wrapped row
            let seq = format!("\x1b[A\x1b[{}C\x1b[K", width - 1);
            self.out.write_raw(seq.as_bytes()).await
        } else {
            self.out.write_raw(b"\x08 \x08").await
        }
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xc0 == 0x80
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, DuplexStream};

    fn terminal(input: &'static [u8], echo: bool) -> (Terminal<&'static [u8]>, DuplexStream) {
        let (client, server) = duplex(64 * 1024);
        let out = TerminalWriter::new(server);
        let size = Arc::new(TerminalSize::default());
        (Terminal::new(input, out, "root> ", size).with_echo(echo), client)
    }

    async fn drain(mut client: DuplexStream) -> String {
        let mut out = Vec::new();
        client.read_to_end(&mut out).await.unwrap();
        String::from_utf8_lossy(&out).into_owned()
    }

    #[tokio::test]
    async fn test_reads_lines_with_mixed_endings() {
        let (mut term, _client) = terminal(b"whoami\r\necho hi\nlast\r", false);
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some("whoami"));
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some("echo hi"));
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some("last"));
        assert_eq!(term.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_prompt_written_per_line() {
        let (mut term, client) = terminal(b"a\nb\n", false);
        term.read_line().await.unwrap();
        term.read_line().await.unwrap();
        drop(term);
        assert_eq!(drain(client).await, "root> root> ");
    }

    #[tokio::test]
    async fn test_backspace_and_clear_line() {
        let (mut term, _client) = terminal(b"whx\x7fo\x08oami\n junk\x15exit\n", false);
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some("whoami"));
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some("exit"));
    }

    #[tokio::test]
    async fn test_ctrl_d_on_empty_line_is_eof() {
        let (mut term, _client) = terminal(b"\x04whoami\n", false);
        assert_eq!(term.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ctrl_d_ignored_mid_line() {
        let (mut term, _client) = terminal(b"who\x04ami\n", false);
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some("whoami"));
    }

    #[tokio::test]
    async fn test_ctrl_c_abandons_line() {
        let (mut term, _client) = terminal(b"rm -rf\x03whoami\n", false);
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some(""));
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some("whoami"));
    }

    #[tokio::test]
    async fn test_escape_sequences_swallowed() {
        let (mut term, _client) = terminal(b"ec\x1b[Dho\x1bOA hi\n", false);
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some("echo hi"));
    }

    #[tokio::test]
    async fn test_utf8_input() {
        let (mut term, _client) = terminal("echo héllo ✓\n".as_bytes(), false);
        assert_eq!(
            term.read_line().await.unwrap().as_deref(),
            Some("echo héllo ✓")
        );
    }

    #[tokio::test]
    async fn test_broken_utf8_keeps_following_input() {
        let (mut term, _client) = terminal(b"echo \xC3hi\n", false);
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some("echo hi"));
    }

    #[tokio::test]
    async fn test_broken_utf8_before_enter() {
        let (mut term, _client) = terminal(b"whoami\xE2\x9C\nexit\n", false);
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some("whoami"));
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some("exit"));
    }

    #[tokio::test]
    async fn test_stray_continuation_dropped() {
        let (mut term, _client) = terminal(b"wh\x80oami\n", false);
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some("whoami"));
    }

    #[tokio::test]
    async fn test_ctrl_c_silent_without_echo() {
        let (mut term, client) = terminal(b"ls\x03\n", false);
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some(""));
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some(""));
        drop(term);
        assert_eq!(drain(client).await, "root> root> ");
    }

    #[tokio::test]
    async fn test_ctrl_c_echoed_with_pty() {
        let (mut term, client) = terminal(b"ls\x03", true);
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some(""));
        drop(term);
        assert_eq!(drain(client).await, "root> ls^C\r\n");
    }

    #[tokio::test]
    async fn test_partial_line_at_eof() {
        let (mut term, _client) = terminal(b"whoami", false);
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some("whoami"));
        assert_eq!(term.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_echo_renders_input() {
        let (mut term, client) = terminal(b"ab\x7fc\n", true);
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some("ac"));
        drop(term);
        assert_eq!(drain(client).await, "root> ab\x08 \x08c\r\n");
    }

    #[tokio::test]
    async fn test_echo_wraps_at_width() {
        let (client, server) = duplex(64 * 1024);
        let size = Arc::new(TerminalSize::new(WindowSize::new(8, 24)));
        let mut term =
            Terminal::new(&b"abc\x7f\n"[..], TerminalWriter::new(server), "root> ", size)
                .with_echo(true);
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some("ab"));
        drop(term);
        assert_eq!(drain(client).await, "root> ab\r\nc\x08 \x08\r\n");
    }

    #[tokio::test]
    async fn test_erase_across_wrap() {
        let (client, server) = duplex(64 * 1024);
        let size = Arc::new(TerminalSize::new(WindowSize::new(8, 24)));
        let mut term =
            Terminal::new(&b"ab\x7f\n"[..], TerminalWriter::new(server), "root> ", size)
                .with_echo(true);
        assert_eq!(term.read_line().await.unwrap().as_deref(), Some("a"));
        drop(term);
        assert_eq!(drain(client).await, "root> ab\r\n\x1b[A\x1b[7C\x1b[K\r\n");
    }
}
