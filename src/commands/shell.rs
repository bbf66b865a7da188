use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::dispatch::{Command, CommandError, CommandResult, Outcome};
use crate::output::sanitize;
use crate::session::SessionContext;

/// Default bound on a `shell` invocation.
pub const DEFAULT_SHELL_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs one script through `sh -c`, e.g. `shell 'ls -la /var/log'`.
///
/// Output is collected, stripped of escape sequences, and written once the
/// process exits. The child is killed on timeout or when the session ends.
/// Only registered when explicitly enabled.
#[derive(Debug, Clone)]
pub struct ShellCommand {
    timeout: Duration,
}

impl ShellCommand {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ShellCommand {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL_TIMEOUT)
    }
}

#[async_trait]
impl Command for ShellCommand {
    async fn execute(&self, ctx: &SessionContext, argv: &[String]) -> CommandResult {
        let [script] = argv else {
            return Err(CommandError::usage("shell '<script>'"));
        };
        info!(script = %script, "running shell script");

        let child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CommandError::failed(format!("spawning sh: {}", e)))?;

        let output = tokio::select! {
            _ = ctx.cancellation().cancelled() => {
                debug!("session ended while script was running");
                return Err(CommandError::failed("cancelled"));
            }
            result = tokio::time::timeout(self.timeout, child.wait_with_output()) => match result {
                Ok(output) => output?,
                Err(_) => {
                    return Err(CommandError::failed(format!(
                        "timed out after {}s",
                        self.timeout.as_secs()
                    )));
                }
            },
        };

        let mut text = sanitize(&output.stdout);
        text.push_str(&sanitize(&output.stderr));
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        ctx.terminal().write_str(&text).await?;

        if output.status.success() {
            Ok(Outcome::Continue)
        } else {
            Err(CommandError::failed(match output.status.code() {
                Some(code) => format!("exit status {}", code),
                None => "terminated by signal".to_string(),
            }))
        }
    }

    fn summary(&self) -> &str {
        "run a system shell script, e.g. shell 'ls -hlatr'"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::dispatch::CommandRegistry;
    use crate::session::testing::test_context;
    use tokio::io::AsyncReadExt;

    async fn run(command: &ShellCommand, argv: &[&str]) -> (CommandResult, String) {
        let (ctx, mut client) = test_context("root", CommandRegistry::new().freeze());
        let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
        let result = command.execute(&ctx, &argv).await;
        drop(ctx);
        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        (result, out)
    }

    #[tokio::test]
    async fn test_runs_script() {
        let (result, out) = run(&ShellCommand::default(), &["printf 'a\\nb\\n'"]).await;
        assert!(result.is_ok());
        assert_eq!(out, "a\r\nb\r\n");
    }

    #[tokio::test]
    async fn test_unterminated_output_gets_newline() {
        let (result, out) = run(&ShellCommand::default(), &["printf done"]).await;
        assert!(result.is_ok());
        assert_eq!(out, "done\r\n");
    }

    #[tokio::test]
    async fn test_silent_script_writes_nothing() {
        let (result, out) = run(&ShellCommand::default(), &["true"]).await;
        assert!(result.is_ok());
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let (result, _) = run(&ShellCommand::default(), &["exit 3"]).await;
        assert_eq!(result.unwrap_err().to_string(), "exit status 3");
    }

    #[tokio::test]
    async fn test_requires_single_argument() {
        let (result, _) = run(&ShellCommand::default(), &["ls", "-la"]).await;
        assert!(matches!(result, Err(CommandError::Usage(_))));
    }

    #[tokio::test]
    async fn test_timeout() {
        let command = ShellCommand::new(Duration::from_millis(100));
        let (result, _) = run(&command, &["sleep 5"]).await;
        assert!(result.unwrap_err().to_string().starts_with("timed out"));
    }
}
