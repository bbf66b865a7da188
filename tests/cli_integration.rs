//! CLI integration tests.
//!
//! These tests verify the CLI argument parsing and configuration loading.

use std::ffi::OsString;
use std::io::Write;
use tempfile::NamedTempFile;

use sshebra::cli::{parse_args_from, Args};
use sshebra::config::Config;

fn args(args: &[&str]) -> Vec<OsString> {
    std::iter::once("sshebra")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

fn config_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

// ============================================================================
// CLI Argument Tests
// ============================================================================

#[test]
fn test_cli_full_options() {
    let result = parse_args_from(args(&[
        "-H",
        "0.0.0.0",
        "-p",
        "2222",
        "-k",
        "s3cret=root",
        "-l",
        "debug",
        "--enable-shell",
    ]))
    .unwrap();

    assert_eq!(result.host.unwrap().to_string(), "0.0.0.0");
    assert_eq!(result.port, Some(2222));
    assert_eq!(
        result.keys,
        vec![("s3cret".to_string(), "root".to_string())]
    );
    assert_eq!(result.log_level, Some("debug".to_string()));
    assert!(result.enable_shell);
}

#[test]
fn test_cli_config_file() {
    let result = parse_args_from(args(&["-c", "/etc/sshebra.json"])).unwrap();

    assert_eq!(
        result.config.unwrap().to_str().unwrap(),
        "/etc/sshebra.json"
    );
}

#[test]
fn test_cli_missing_value() {
    assert!(parse_args_from(args(&["--port"])).is_err());
}

#[test]
fn test_cli_unknown_option() {
    assert!(parse_args_from(args(&["--no-such-flag"])).is_err());
}

// ============================================================================
// Configuration Loading Tests
// ============================================================================

#[test]
fn test_config_from_json_file() {
    let file = config_file(
        r#"{
            "server": {
                "host": "192.168.1.100",
                "port": 9000,
                "handshake_timeout_secs": 3
            },
            "auth": {
                "keys": { "k1": "root", "k2": "ops" }
            },
            "commands": {
                "shell": true,
                "shell_timeout_secs": 60
            },
            "logging": {
                "level": "debug"
            }
        }"#,
    );

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.server.host, "192.168.1.100");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.handshake_timeout().as_secs(), 3);
    assert_eq!(config.key_store().identity_for("k2"), Some("ops"));
    assert!(config.commands.shell);
    assert_eq!(config.commands.shell_timeout_secs, 60);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_config_priority_cli_over_file() {
    let file = config_file(r#"{ "server": { "host": "10.0.0.1", "port": 5000 } }"#);

    let args = Args {
        host: Some("192.168.1.1".parse().unwrap()),
        port: Some(8080),
        config: Some(file.path().to_path_buf()),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();

    assert_eq!(config.server.host, "192.168.1.1");
    assert_eq!(config.server.port, 8080);
}

#[test]
fn test_config_file_values_survive_absent_args() {
    let file = config_file(r#"{ "server": { "port": 5000 } }"#);

    let args = Args {
        config: Some(file.path().to_path_buf()),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();
    assert_eq!(config.server.port, 5000);
}

#[test]
fn test_config_cli_keys_merge_with_file() {
    let file = config_file(r#"{ "auth": { "keys": { "file-key": "alice" } } }"#);

    let args = parse_args_from(args(&[
        "-c",
        file.path().to_str().unwrap(),
        "-k",
        "cli-key=bob",
    ]))
    .unwrap();
    let config = Config::load(&args).unwrap();
    let keys = config.key_store();

    assert_eq!(keys.identity_for("file-key"), Some("alice"));
    assert_eq!(keys.identity_for("cli-key"), Some("bob"));
}

#[test]
fn test_config_enable_shell_registers_command() {
    let args = parse_args_from(args(&["--enable-shell"])).unwrap();
    let config = Config::load(&args).unwrap();

    let registry = config.build_registry();
    assert!(registry.contains("shell"));
}

#[test]
fn test_config_missing_file() {
    let args = Args {
        config: Some("/nonexistent/sshebra.json".into()),
        ..Args::default()
    };

    assert!(Config::load(&args).is_err());
}

// ============================================================================
// Configuration Serialization Tests
// ============================================================================

#[test]
fn test_config_roundtrip() {
    let mut original = Config::default();
    original.auth.keys.insert("k".into(), "root".into());
    let json = serde_json::to_string(&original).unwrap();
    let loaded: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(original.server.host, loaded.server.host);
    assert_eq!(original.server.port, loaded.server.port);
    assert_eq!(original.auth.keys, loaded.auth.keys);
}

#[test]
fn test_config_partial_deserialization() {
    let json = r#"{"commands": {"shell": true}}"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert!(config.commands.shell);
    assert_eq!(config.commands.shell_timeout_secs, 30);
    assert_eq!(config.server.port, 4242);
}
