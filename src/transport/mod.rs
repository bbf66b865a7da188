//! Transport boundary.
//!
//! The shell itself only needs an authenticated byte stream wrapped in a
//! [`Connection`]. Any transport that can produce one (an SSH server
//! channel, a test duplex pipe) can drive a session. [`TcpServer`] is a
//! minimal built-in transport authenticating clients by access key.

mod auth;
mod connection;
mod tcp;

pub use auth::{parse_key_spec, KeyStore};
pub use connection::{Connection, PtyRequest};
pub use tcp::{read_handshake, Handshake, PtySpec, TcpServer, DEFAULT_HANDSHAKE_TIMEOUT};
