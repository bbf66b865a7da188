//! Reduce process output to text that is safe to write to a client terminal.

use vte::{Params, Parser, Perform};

/// Strip escape sequences and stray control characters from `input`.
///
/// Newlines and tabs are kept; carriage returns and other C0 controls are
/// dropped, since the terminal writer supplies its own line endings.
pub fn sanitize(input: &[u8]) -> String {
    let mut text = PlainText(String::with_capacity(input.len()));
    Parser::new().advance(&mut text, input);
    text.0
}

struct PlainText(String);

impl Perform for PlainText {
    fn print(&mut self, c: char) {
        self.0.push(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' => self.0.push('\n'),
            b'\t' => self.0.push('\t'),
            _ => {}
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}

    fn csi_dispatch(
        &mut self,
        _params: &Params,
        _intermediates: &[u8],
        _ignore: bool,
        _action: char,
    ) {
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}
}
