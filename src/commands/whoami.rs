use async_trait::async_trait;

use crate::dispatch::{Command, CommandError, CommandResult, Outcome};
use crate::session::SessionContext;

/// Prints the authenticated identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhoamiCommand;

#[async_trait]
impl Command for WhoamiCommand {
    async fn execute(&self, ctx: &SessionContext, argv: &[String]) -> CommandResult {
        if !argv.is_empty() {
            return Err(CommandError::usage("whoami takes no arguments"));
        }
        ctx.terminal().write_line(ctx.identity()).await?;
        Ok(Outcome::Continue)
    }

    fn summary(&self) -> &str {
        "print user identity"
    }
}
