//! Shell-style splitting of input lines.

use crate::Result;

/// Split one input line into arguments.
///
/// Follows POSIX shell quoting: single and double quotes group words,
/// backslash escapes the next character. An unterminated quote is an
/// error rather than a partial result.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    Ok(shell_words::split(line)?)
}

/// Separate the command name from its arguments.
pub fn split_command(argv: &[String]) -> Option<(&str, &[String])> {
    argv.split_first().map(|(name, rest)| (name.as_str(), rest))
}
