use async_trait::async_trait;

use crate::dispatch::{Command, CommandResult, Outcome};
use crate::session::SessionContext;

/// Prints the terminal size as last reported by the client.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeCommand;

#[async_trait]
impl Command for SizeCommand {
    async fn execute(&self, ctx: &SessionContext, _argv: &[String]) -> CommandResult {
        let size = ctx.window_size();
        ctx.terminal()
            .write_line(&format!("{}x{}", size.width, size.height))
            .await?;
        Ok(Outcome::Continue)
    }

    fn summary(&self) -> &str {
        "print terminal dimensions"
    }
}
