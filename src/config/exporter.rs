//! Exporter configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file,
//! then environment variables. The binary applies CLI overrides on top
//! before calling [`ExporterConfig::validate`].

use super::DatabaseConfig;
use crate::probe::ProbeStrategy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default port of the `/metrics` endpoint.
pub const DEFAULT_LISTEN_PORT: u16 = 9101;

/// Environment variable naming the world server process.
pub const MANGOS_PROCESS_NAME: &str = "MANGOS_PROCESS_NAME";
/// Environment variable naming the realm process.
pub const REALM_PROCESS_NAME: &str = "REALM_PROCESS_NAME";

/// Configuration loading and validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
    /// An environment variable holds an unusable value.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
    /// A monitored process name is blank.
    #[error("{0} process name must not be empty")]
    EmptyProcessName(&'static str),
    /// The listen port is zero.
    #[error("listen port must be non-zero")]
    InvalidListenPort,
    /// A timeout is zero.
    #[error("{0} timeout must be at least one second")]
    InvalidTimeout(&'static str),
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port for the `/metrics` endpoint.
    pub listen_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_port: DEFAULT_LISTEN_PORT,
        }
    }
}

/// Names of the two processes whose liveness is exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeTargets {
    /// World server process name.
    pub server: String,
    /// Realm (authentication) server process name.
    pub realm: String,
}

impl Default for ProbeTargets {
    fn default() -> Self {
        Self {
            server: "mangosd".to_string(),
            realm: "realmd".to_string(),
        }
    }
}

/// Process probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Which probe implementation to use.
    pub strategy: ProbeStrategy,
    /// Upper bound on a single probe invocation, in seconds.
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            strategy: ProbeStrategy::Substring,
            timeout_secs: 5,
        }
    }
}

impl ProbeConfig {
    /// Returns the per-probe timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Full exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExporterConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Monitored process names.
    #[serde(default)]
    pub processes: ProbeTargets,
    /// Process probe settings.
    #[serde(default)]
    pub probe: ProbeConfig,
    /// Character database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl ExporterConfig {
    /// Loads defaults, an optional TOML file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text. Missing sections take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Applies environment overrides through `lookup`.
    ///
    /// An empty value is treated the same as an unset variable.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(name) = get(MANGOS_PROCESS_NAME) {
            self.processes.server = name;
        }
        if let Some(name) = get(REALM_PROCESS_NAME) {
            self.processes.realm = name;
        }
        self.database.apply_env(&lookup)
    }

    /// Validates the final configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen_port == 0 {
            return Err(ConfigError::InvalidListenPort);
        }
        if self.processes.server.trim().is_empty() {
            return Err(ConfigError::EmptyProcessName("server"));
        }
        if self.processes.realm.trim().is_empty() {
            return Err(ConfigError::EmptyProcessName("realm"));
        }
        if self.probe.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("probe"));
        }
        if self.database.enabled && self.database.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("database"));
        }
        Ok(())
    }
}
