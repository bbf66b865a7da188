//! Command contract, registry, and line tokenization.
//!
//! # Example
//!
//! ```
//! use sshebra::commands::{EchoCommand, WhoamiCommand};
//! use sshebra::dispatch::CommandRegistry;
//!
//! let mut registry = CommandRegistry::new();
//! registry.register("whoami", WhoamiCommand);
//! registry.register("echo", EchoCommand);
//! let registry = registry.freeze();
//!
//! assert_eq!(registry.names(), vec!["echo", "whoami"]);
//! ```

mod command;
mod registry;
mod tokenize;

pub use command::{Command, CommandError, CommandResult, Outcome};
pub use registry::CommandRegistry;
pub use tokenize::{split_command, tokenize};
