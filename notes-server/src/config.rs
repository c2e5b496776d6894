//! Server configuration
//!
//! Values come from an optional TOML file (path in `NOTES_CONFIG`, default
//! `config.toml`) and are then overridden by the environment:
//! `HOST`, `PORT`, `DATABASE_URL`, `DATABASE_NAME`.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const CONFIG_PATH_ENV: &str = "NOTES_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const DATABASE_NAME_ENV: &str = "DATABASE_NAME";

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid port '{0}'")]
    InvalidPort(String),

    #[error("Invalid listen address '{0}'")]
    InvalidAddress(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Store connection string; `None` leaves the store unavailable
    pub database_url: Option<String>,
    pub database_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            database_url: None,
            database_name: None,
        }
    }
}

impl Config {
    /// Load from the config file (if any) and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let base = Self::from_file(Path::new(&path))?;
        base.apply_env(|key| std::env::var(key).ok())
    }

    /// Read a TOML file, or fall back to defaults when it does not exist
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Override values with whatever `lookup` finds. Empty values count as unset.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get(HOST_ENV) {
            self.host = host;
        }
        if let Some(port) = get(PORT_ENV) {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(url) = get(DATABASE_URL_ENV) {
            self.database_url = Some(url);
        }
        if let Some(name) = get(DATABASE_NAME_ENV) {
            self.database_name = Some(name);
        }

        Ok(self)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default().apply_env(env(&[])).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.database_url.is_none());
        assert_eq!(config.socket_addr().unwrap().port(), 8000);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = Config::from_toml(
            r#"
            host = "127.0.0.1"
            port = 9000
            database_url = "memory://"
            database_name = "from_file"
            "#,
        )
        .unwrap();

        let config = file
            .apply_env(env(&[("PORT", "8081"), ("DATABASE_NAME", "from_env")]))
            .unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8081);
        assert_eq!(config.database_url.as_deref(), Some("memory://"));
        assert_eq!(config.database_name.as_deref(), Some("from_env"));
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let config = Config::default()
            .apply_env(env(&[("DATABASE_URL", ""), ("PORT", " ")]))
            .unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::default()
            .apply_env(env(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(p) if p == "eighty"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = Config::from_file(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml("database_url = \"file:data\"").unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.database_url.as_deref(), Some("file:data"));
    }
}
