//! Name to command mapping and dispatch.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use tracing::debug;

use super::command::{Command, Outcome};
use crate::session::SessionContext;

/// Registry of named commands.
///
/// Populated during setup through `&mut self`, then frozen into an
/// `Arc` and shared read-only by every session. Lookups are exact and
/// case-sensitive.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command, replacing any previous one with the same name.
    ///
    /// Returns the replaced command, if any.
    pub fn register<C>(&mut self, name: impl Into<String>, command: C) -> Option<Arc<dyn Command>>
    where
        C: Command + 'static,
    {
        self.commands.insert(name.into(), Arc::new(command))
    }

    /// Freeze the registry for sharing across sessions.
    pub fn freeze(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve `name` and run it with `argv`.
    ///
    /// Unknown names and command failures are reported on the session's
    /// terminal and yield [`Outcome::Continue`]. The only error returned is
    /// a failure to write to the terminal.
    pub async fn dispatch(
        &self,
        ctx: &SessionContext,
        name: &str,
        argv: &[String],
    ) -> io::Result<Outcome> {
        let Some(command) = self.commands.get(name) else {
            debug!(command = %name, "unknown command");
            ctx.terminal()
                .write_line(&format!("unknown command {}", name))
                .await?;
            return Ok(Outcome::Continue);
        };

        debug!(command = %name, args = ?argv, "dispatching");
        match command.execute(ctx, argv).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                debug!(command = %name, error = %e, "command failed");
                ctx.terminal().write_line(&e.to_string()).await?;
                Ok(Outcome::Continue)
            }
        }
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}
