//! Character database connection settings.
//!
//! The descriptor is a template: every player-count query opens a new
//! connection from it and closes it afterwards. Nothing is pooled.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlConnectOptions;
use std::fmt;
use std::time::Duration;

/// Mask substituted for the password in logged descriptors.
pub const PASSWORD_MASK: &str = "***";

/// Logged instead of the descriptor when masking alone cannot hide the password.
const REDACTED_PLACEHOLDER: &str = "<redacted>";

/// Environment variable holding the database user.
pub const MYSQL_USER: &str = "MYSQL_USER";
/// Environment variable holding the database password.
pub const MYSQL_PASSWORD: &str = "MYSQL_PASSWORD";
/// Environment variable holding the database host.
pub const MYSQL_HOST: &str = "MYSQL_HOST";
/// Environment variable holding the database port.
pub const MYSQL_PORT: &str = "MYSQL_PORT";
/// Environment variable holding the character database name.
pub const MYSQL_CHAR_DB: &str = "MYSQL_CHAR_DB";

/// Connection settings for the character database.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Whether the online player count is exported at all.
    pub enabled: bool,
    /// Database user.
    pub user: String,
    /// Database password (may be empty).
    pub password: String,
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Character database name.
    pub name: String,
    /// Upper bound on connect plus query, in seconds.
    pub timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            user: "mangos_monitor".to_string(),
            password: String::new(),
            host: "localhost".to_string(),
            port: 3306,
            name: "character0".to_string(),
            timeout_secs: 5,
        }
    }
}

// Hand-written so the password never reaches a log line through `{:?}`.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("enabled", &self.enabled)
            .field("user", &self.user)
            .field("password", &PASSWORD_MASK)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl DatabaseConfig {
    /// Overrides fields from `MYSQL_*` variables. Empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(user) = get(MYSQL_USER) {
            self.user = user;
        }
        if let Some(password) = get(MYSQL_PASSWORD) {
            self.password = password;
        }
        if let Some(host) = get(MYSQL_HOST) {
            self.host = host;
        }
        if let Some(port) = get(MYSQL_PORT) {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: MYSQL_PORT,
                value: port.clone(),
            })?;
        }
        if let Some(name) = get(MYSQL_CHAR_DB) {
            self.name = name;
        }
        Ok(())
    }

    /// Returns the connect-plus-query timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds typed connect options; no URL escaping is involved.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }

    /// Returns the descriptor in `user:password@tcp(host:port)/database` form
    /// with the password hidden, suitable for logging.
    pub fn redacted_descriptor(&self) -> String {
        let password = if self.password.is_empty() {
            ""
        } else {
            PASSWORD_MASK
        };
        let descriptor = format!(
            "{}:{}@tcp({}:{})/{}",
            self.user, password, self.host, self.port, self.name
        );
        redact(&descriptor, &self.password)
    }
}

/// Replaces every occurrence of `secret` in `text` with [`PASSWORD_MASK`].
///
/// The result never contains a non-empty `secret`. If masking produces a
/// new occurrence (the secret overlaps the mask), a fixed placeholder is
/// returned instead. An empty secret leaves `text` untouched.
pub fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }

    let masked = text.replace(secret, PASSWORD_MASK);
    if !masked.contains(secret) {
        return masked;
    }
    if !REDACTED_PLACEHOLDER.contains(secret) {
        return REDACTED_PLACEHOLDER.to_string();
    }
    String::new()
}
