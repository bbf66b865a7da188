//! Built-in commands.
//!
//! Every command here is an independent [`Command`](crate::dispatch::Command)
//! implementation; nothing in the session loop depends on them except
//! through the registry.

mod echo;
mod exit;
mod flags;
mod help;
mod shell;
mod size;
mod whoami;

pub use echo::{EchoCommand, TimesCommand};
pub use exit::ExitCommand;
pub use flags::FlagsCommand;
pub use help::HelpCommand;
pub use shell::{ShellCommand, DEFAULT_SHELL_TIMEOUT};
pub use size::SizeCommand;
pub use whoami::WhoamiCommand;

use crate::dispatch::{CommandError, CommandRegistry};

/// Register the always-available commands.
///
/// `shell` is not included; it is opt-in through configuration.
pub fn register_builtins(registry: &mut CommandRegistry) {
    registry.register("exit", ExitCommand);
    registry.register("whoami", WhoamiCommand);
    registry.register("echo", EchoCommand);
    registry.register("times", TimesCommand);
    registry.register("flags", FlagsCommand);
    registry.register("size", SizeCommand);
    registry.register("help", HelpCommand);
}

fn usage_error(command: &str, err: lexopt::Error) -> CommandError {
    CommandError::usage(format!("{}: {}", command, err))
}
