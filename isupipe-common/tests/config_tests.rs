//! Unit tests for configuration resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate ISUPIPE_DATABASE are marked with #[serial].

use isupipe_common::config::{
    load_toml_config, resolve_database_path, ServerConfig, TomlConfig, DATABASE_ENV_VAR,
    DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT, DEFAULT_SESSION_COOKIE,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};

#[test]
#[serial]
fn test_cli_argument_wins() {
    env::set_var(DATABASE_ENV_VAR, "/tmp/from-env.db");

    let path = resolve_database_path(
        Some(Path::new("/tmp/from-cli.db")),
        DATABASE_ENV_VAR,
        Some(Path::new("/tmp/from-toml.db")),
    );

    env::remove_var(DATABASE_ENV_VAR);
    assert_eq!(path, PathBuf::from("/tmp/from-cli.db"));
}

#[test]
#[serial]
fn test_env_beats_toml() {
    env::set_var(DATABASE_ENV_VAR, "/tmp/from-env.db");

    let path = resolve_database_path(None, DATABASE_ENV_VAR, Some(Path::new("/tmp/from-toml.db")));

    env::remove_var(DATABASE_ENV_VAR);
    assert_eq!(path, PathBuf::from("/tmp/from-env.db"));
}

#[test]
#[serial]
fn test_toml_beats_default() {
    env::remove_var(DATABASE_ENV_VAR);

    let path = resolve_database_path(None, DATABASE_ENV_VAR, Some(Path::new("/tmp/from-toml.db")));

    assert_eq!(path, PathBuf::from("/tmp/from-toml.db"));
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    env::remove_var(DATABASE_ENV_VAR);

    let config = ServerConfig::resolve(None, None, &TomlConfig::default());

    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    assert_eq!(config.session_cookie, DEFAULT_SESSION_COOKIE);
    assert!(config.database_path.ends_with("isupipe.db"));
}

#[test]
#[serial]
fn test_toml_values_applied() {
    env::remove_var(DATABASE_ENV_VAR);

    let toml = TomlConfig {
        database_path: Some(PathBuf::from("/srv/isupipe/data.db")),
        port: Some(9000),
        max_connections: Some(0),
        session_cookie: Some("sid".to_string()),
    };
    let config = ServerConfig::resolve(Some(9100), None, &toml);

    assert_eq!(config.port, 9100);
    assert_eq!(config.database_path, PathBuf::from("/srv/isupipe/data.db"));
    // Zero is not a usable pool size
    assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    assert_eq!(config.session_cookie, "sid");
}

#[test]
fn test_missing_config_file_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_toml_config(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_config_file_is_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = 8181\nsession_cookie = \"sid\"\n").unwrap();

    let config = load_toml_config(Some(&path)).unwrap();

    assert_eq!(config.port, Some(8181));
    assert_eq!(config.session_cookie.as_deref(), Some("sid"));
    assert_eq!(config.database_path, None);
}

#[test]
fn test_malformed_config_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = [").unwrap();

    assert!(load_toml_config(Some(&path)).is_err());
}
