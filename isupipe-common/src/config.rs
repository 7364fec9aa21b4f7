//! Configuration loading and database path resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default SQLite connection pool size
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Default name of the session cookie
pub const DEFAULT_SESSION_COOKIE: &str = "isupipe_session";

/// Environment variable overriding the database path
pub const DATABASE_ENV_VAR: &str = "ISUPIPE_DATABASE";

/// Optional settings read from `config.toml`
///
/// Every field may be omitted; missing fields fall back to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub max_connections: Option<u32>,
    pub session_cookie: Option<String>,
}

/// Fully resolved server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub database_path: PathBuf,
    pub max_connections: u32,
    pub session_cookie: String,
}

impl ServerConfig {
    /// Merge command-line values, environment, TOML file and defaults
    ///
    /// Port: CLI (clap also reads `ISUPIPE_PORT`) > TOML > default.
    /// Database path: see [`resolve_database_path`].
    pub fn resolve(cli_port: Option<u16>, cli_database: Option<&Path>, toml: &TomlConfig) -> Self {
        let port = cli_port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let database_path =
            resolve_database_path(cli_database, DATABASE_ENV_VAR, toml.database_path.as_deref());
        let max_connections = toml
            .max_connections
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let session_cookie = toml
            .session_cookie
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string());

        Self {
            port,
            database_path,
            max_connections,
            session_cookie,
        }
    }
}

/// Database path resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default
pub fn resolve_database_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_value: Option<&Path>,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = toml_value {
        return path.to_path_buf();
    }

    default_database_path()
}

/// Load the TOML config file
///
/// A missing file is not an error: a warning is logged and defaults are used.
/// A file that exists but fails to parse is a configuration error.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) => p,
            None => return Ok(TomlConfig::default()),
        },
    };

    if !path.exists() {
        warn!("Config file not found: {} (using defaults)", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let config = parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// Parse TOML config content
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
}

/// `<config dir>/isupipe/config.toml`
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("isupipe").join("config.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("isupipe"))
        .unwrap_or_else(|| PathBuf::from("./isupipe_data"))
        .join("isupipe.db")
}
