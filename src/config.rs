//! Configuration management for sshebra.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::commands::{register_builtins, ShellCommand};
use crate::dispatch::CommandRegistry;
use crate::transport::{parse_key_spec, KeyStore};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listener configuration.
    pub server: ServerSection,
    /// Access keys.
    pub auth: AuthSection,
    /// Optional commands.
    pub commands: CommandsSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Seconds a client has to complete its handshake.
    pub handshake_timeout_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4242,
            handshake_timeout_secs: 10,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// Access key to identity.
    pub keys: BTreeMap<String, String>,
}

/// Commands configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsSection {
    /// Register the `shell` command.
    pub shell: bool,
    /// Seconds a `shell` child may run before it is killed.
    pub shell_timeout_secs: u64,
}

impl Default for CommandsSection {
    fn default() -> Self {
        Self {
            shell: false,
            shell_timeout_secs: 30,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SSHEBRA_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("SSHEBRA_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(spec) = std::env::var("SSHEBRA_KEY") {
            if let Some((key, identity)) = parse_key_spec(&spec) {
                self.auth.keys.insert(key, identity);
            }
        }

        if let Ok(level) = std::env::var("SSHEBRA_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = args.host {
            self.server.host = host.to_string();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }

        for (key, identity) in &args.keys {
            self.auth.keys.insert(key.clone(), identity.clone());
        }

        if args.enable_shell {
            self.commands.shell = true;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env();
        config.apply_args(args);
        Ok(config)
    }

    /// Address the listener binds to.
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.server.host.clone()))?;
        Ok(SocketAddr::new(host, self.server.port))
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.server.handshake_timeout_secs)
    }

    /// Key store for the TCP transport.
    pub fn key_store(&self) -> KeyStore {
        self.auth
            .keys
            .iter()
            .map(|(key, identity)| (key.as_str(), identity.as_str()))
            .collect()
    }

    /// Registry with the built-in commands plus whatever is enabled here.
    pub fn build_registry(&self) -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        register_builtins(&mut registry);
        if self.commands.shell {
            registry.register(
                "shell",
                ShellCommand::new(Duration::from_secs(self.commands.shell_timeout_secs)),
            );
        }
        registry
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Invalid host address.
    InvalidHost(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidHost(host) => write!(f, "invalid host address: {}", host),
        }
    }
}

impl std::error::Error for ConfigError {}
