use async_trait::async_trait;

use super::usage_error;
use crate::dispatch::{Command, CommandError, CommandResult, Outcome};
use crate::session::SessionContext;

/// Parses `--enable`, `--name NAME`, and positional arguments, then
/// reports what it understood. Useful for checking how a line was split.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagsCommand;

#[derive(Debug, Default, PartialEq, Eq)]
struct ParsedFlags {
    enable: bool,
    name: String,
    tail: Vec<String>,
}

fn parse(argv: &[String]) -> Result<ParsedFlags, CommandError> {
    use lexopt::prelude::*;

    let mut parsed = ParsedFlags::default();
    let mut parser = lexopt::Parser::from_args(argv.iter().map(String::as_str));

    while let Some(arg) = parser.next().map_err(|e| usage_error("flags", e))? {
        match arg {
            Long("enable") => parsed.enable = true,
            Long("name") => {
                parsed.name = parser
                    .value()
                    .and_then(|v| v.string())
                    .map_err(|e| usage_error("flags", e))?;
            }
            Value(val) => {
                parsed
                    .tail
                    .push(val.string().map_err(|e| usage_error("flags", e))?);
            }
            _ => return Err(usage_error("flags", arg.unexpected())),
        }
    }
    Ok(parsed)
}

#[async_trait]
impl Command for FlagsCommand {
    async fn execute(&self, ctx: &SessionContext, argv: &[String]) -> CommandResult {
        let parsed = parse(argv)?;
        let report = format!(
            "parsed flags:\n  - enable: \t{}\n  - name: \t{}\n  - tail: \t[{}]\n",
            parsed.enable,
            parsed.name,
            parsed.tail.join(" ")
        );
        ctx.terminal().write_str(&report).await?;
        Ok(Outcome::Continue)
    }

    fn summary(&self) -> &str {
        "show how --enable, --name and trailing args were parsed"
    }
}
