//! Application-level configuration loading: storage backend selection and listen port.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "YAHTZEE_BACK_CONFIG_PATH";
/// Port used when neither the file nor the environment provide one.
const DEFAULT_PORT: u16 = 8080;

/// Persistence backend selected at start-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local maps, lost on restart.
    #[default]
    Memory,
    /// MongoDB, configured through `MONGO_URI` and `MONGO_DB`.
    Mongo,
    /// CouchDB, configured through the `COUCH_*` variables.
    Couch,
}

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    storage: StorageBackend,
    port: u16,
}

impl AppConfig {
    /// Load the configuration from disk, then apply environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        storage = ?config.storage,
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.with_port_override(env_port())
    }

    /// Parse the JSON representation found in the configuration file.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Selected persistence backend.
    pub fn storage(&self) -> StorageBackend {
        self.storage
    }

    /// TCP port the HTTP server listens on.
    pub fn port(&self) -> u16 {
        self.port
    }

    fn with_port_override(self, port: Option<u16>) -> Self {
        Self {
            port: port.unwrap_or(self.port),
            ..self
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    storage: StorageBackend,
    port: Option<u16>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            storage: value.storage,
            port: value.port.unwrap_or(DEFAULT_PORT),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// `PORT` wins over `SERVER_PORT`; unparsable values are ignored.
fn env_port() -> Option<u16> {
    ["PORT", "SERVER_PORT"]
        .into_iter()
        .filter_map(|var| env::var(var).ok())
        .find_map(|value| value.trim().parse::<u16>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.storage(), StorageBackend::Memory);
        assert_eq!(config.port(), 8080);
    }

    #[test]
    fn parses_backend_and_port() {
        let config = AppConfig::from_json(r#"{"storage": "couch", "port": 9000}"#).unwrap();
        assert_eq!(config.storage(), StorageBackend::Couch);
        assert_eq!(config.port(), 9000);
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(AppConfig::from_json(r#"{"storage": "postgres"}"#).is_err());
    }

    #[test]
    fn port_override_replaces_file_value() {
        let config = AppConfig::from_json(r#"{"port": 9000}"#).unwrap();
        assert_eq!(config.clone().with_port_override(Some(3000)).port(), 3000);
        assert_eq!(config.with_port_override(None).port(), 9000);
    }
}
