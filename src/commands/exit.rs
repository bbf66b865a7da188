use async_trait::async_trait;

use crate::dispatch::{Command, CommandResult, Outcome};
use crate::session::SessionContext;

/// Ends the session.
///
/// Does not touch the connection itself: it fires the session's
/// cancellation and lets the loop tear down.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitCommand;

#[async_trait]
impl Command for ExitCommand {
    async fn execute(&self, ctx: &SessionContext, _argv: &[String]) -> CommandResult {
        ctx.cancel();
        Ok(Outcome::Exit)
    }

    fn summary(&self) -> &str {
        "terminate the session"
    }
}
