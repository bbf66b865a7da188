use async_trait::async_trait;

use super::usage_error;
use crate::dispatch::{Command, CommandError, CommandResult, Outcome};
use crate::session::SessionContext;

/// Echoes its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoCommand;

#[async_trait]
impl Command for EchoCommand {
    async fn execute(&self, ctx: &SessionContext, argv: &[String]) -> CommandResult {
        if argv.is_empty() {
            return Err(CommandError::usage("echo <string to echo>..."));
        }
        ctx.terminal()
            .write_line(&format!("echo: {}", argv.join(" ")))
            .await?;
        Ok(Outcome::Continue)
    }

    fn summary(&self) -> &str {
        "echo anything to the screen"
    }
}

/// Echoes its arguments a number of times (`-t N`, default 1).
#[derive(Debug, Clone, Copy, Default)]
pub struct TimesCommand;

impl TimesCommand {
    fn parse(argv: &[String]) -> Result<(usize, Vec<String>), CommandError> {
        use lexopt::prelude::*;

        let mut times = 1usize;
        let mut words = Vec::new();
        let mut parser = lexopt::Parser::from_args(argv.iter().map(String::as_str));

        while let Some(arg) = parser.next().map_err(|e| usage_error("times", e))? {
            match arg {
                Short('t') | Long("times") => {
                    times = parser
                        .value()
                        .and_then(|v| v.parse())
                        .map_err(|e| usage_error("times", e))?;
                }
                Value(val) => {
                    words.push(val.string().map_err(|e| usage_error("times", e))?);
                }
                _ => return Err(usage_error("times", arg.unexpected())),
            }
        }

        if words.is_empty() {
            return Err(CommandError::usage("times [-t N] <string to echo>..."));
        }
        Ok((times, words))
    }
}

#[async_trait]
impl Command for TimesCommand {
    async fn execute(&self, ctx: &SessionContext, argv: &[String]) -> CommandResult {
        let (times, words) = Self::parse(argv)?;
        let text = words.join(" ");
        for i in 0..times {
            ctx.terminal()
                .write_line(&format!("time #{}: {}", i, text))
                .await?;
        }
        Ok(Outcome::Continue)
    }

    fn summary(&self) -> &str {
        "echo anything to the screen more times"
    }
}
