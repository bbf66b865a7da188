//! Session management module.
//!
//! One session per accepted connection: bootstrap, the read-eval loop and
//! its state machine, the per-session context, and the resize watcher.

mod context;
mod handler;
mod id;
mod resize;
mod state;

pub use context::{CloseHandle, CloseHook, SessionContext};
pub use handler::{ShellServer, RAW_COMMAND_REJECTION};
pub use id::SessionId;
pub use resize::spawn_resize_watcher;
pub use state::{CloseReason, SessionState};

#[cfg(test)]
pub(crate) use context::testing;
