use async_trait::async_trait;

use crate::dispatch::{Command, CommandResult, Outcome};
use crate::session::SessionContext;

/// Lists the commands available in the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelpCommand;

#[async_trait]
impl Command for HelpCommand {
    async fn execute(&self, ctx: &SessionContext, _argv: &[String]) -> CommandResult {
        let registry = ctx.registry();
        let names = registry.names();
        let width = names.iter().map(|n| n.len()).max().unwrap_or(0);

        let mut out = String::from("available commands:\n");
        for name in names {
            let summary = registry.get(name).map(|c| c.summary()).unwrap_or_default();
            out.push_str(&format!("  {:<width$}  {}\n", name, summary, width = width));
        }
        ctx.terminal().write_str(&out).await?;
        Ok(Outcome::Continue)
    }

    fn summary(&self) -> &str {
        "list available commands"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{ExitCommand, WhoamiCommand};
    use crate::dispatch::CommandRegistry;
    use crate::session::testing::test_context;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_lists_sorted_with_summaries() {
        let mut registry = CommandRegistry::new();
        registry.register("whoami", WhoamiCommand);
        registry.register("exit", ExitCommand);
        registry.register("help", HelpCommand);

        let (ctx, mut client) = test_context("root", registry.freeze());
        HelpCommand.execute(&ctx, &[]).await.unwrap();
        drop(ctx);

        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        assert_eq!(
            out,
            "available commands:\r\n\
             \x20 exit    terminate the session\r\n\
             \x20 help    list available commands\r\n\
             \x20 whoami  print user identity\r\n"
        );
    }
}
