//! Terminal adapter for session streams.
//!
//! - [`Terminal`]: prompt rendering and line editing over the read side
//! - [`TerminalWriter`]: shared, cloneable output handle
//! - [`TerminalSize`]: dimensions updated by the resize watcher

mod editor;
mod size;
mod writer;

pub use editor::Terminal;
pub use size::{TerminalSize, WindowSize};
pub use writer::TerminalWriter;

/// Prompt shown to a client, derived from its identity.
pub fn prompt_for(identity: &str) -> String {
    format!("{}> ", identity)
}
