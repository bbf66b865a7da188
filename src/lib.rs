//! # sshebra
//!
//! Multi-user interactive command shell served over authenticated streams.
//!
//! Each accepted connection gets its own session: a greeting, a prompt
//! derived from the client's identity, a line editor, and a dispatch loop
//! that tokenizes every line and runs the matching registered command.
//!
//! ## Features
//!
//! - **Pluggable commands**: anything implementing [`Command`] can be registered
//! - **Transport-agnostic sessions**: a session runs over any async byte stream
//! - **Built-in TCP transport**: JSON handshake with access-key authentication
//! - **Per-session cancellation**: closing a session stops its in-flight command
//!
//! ## Quick Start
//!
//! ```no_run
//! use sshebra::commands::register_builtins;
//! use sshebra::dispatch::CommandRegistry;
//! use sshebra::transport::{KeyStore, TcpServer};
//! use sshebra::ShellServer;
//!
//! #[tokio::main]
//! async fn main() -> sshebra::Result<()> {
//!     sshebra::logging::try_init().ok();
//!
//!     let mut registry = CommandRegistry::new();
//!     register_builtins(&mut registry);
//!     let shell = ShellServer::new(registry.freeze());
//!
//!     let keys: KeyStore = [("s3cret", "root")].into_iter().collect();
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:4242").await?;
//!     TcpServer::new(shell, keys).serve(listener).await
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod output;
pub mod session;
pub mod terminal;
pub mod transport;

// Re-export commonly used types
pub use dispatch::{Command, CommandError, CommandRegistry, CommandResult, Outcome};
pub use error::{Result, ShellError};
pub use session::{CloseReason, SessionContext, SessionId, SessionState, ShellServer};
pub use transport::{Connection, PtyRequest};
