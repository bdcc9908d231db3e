//! Online player count from the MaNGOS character database.

use crate::config::DatabaseConfig;
use async_trait::async_trait;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::{ConnectOptions, Connection};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Returned by [`PlayerStore::players_online`] when the count is unavailable.
pub const PLAYERS_UNKNOWN: i64 = -1;

const ONLINE_PLAYERS_QUERY: &str = "SELECT COUNT(*) FROM characters WHERE online = 1";

/// Errors that can occur while counting online players.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Opening the connection failed.
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),
    /// Running or decoding the count query failed.
    #[error("failed to query player count: {0}")]
    Query(#[source] sqlx::Error),
    /// Connect plus query exceeded the configured bound.
    #[error("database did not answer within {0:?}")]
    TimedOut(Duration),
    /// `COUNT(*)` came back below zero.
    #[error("database returned a negative player count: {0}")]
    NegativeCount(i64),
}

/// Source of the online player count.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Counts online characters, surfacing any failure.
    async fn count_online(&self) -> Result<i64, StoreError>;

    /// Counts online characters, or returns [`PLAYERS_UNKNOWN`] on failure.
    ///
    /// Failures are logged here; callers only see the sentinel.
    async fn players_online(&self) -> i64 {
        match self.count_online().await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(error = %e, "Error querying player count");
                PLAYERS_UNKNOWN
            }
        }
    }
}

/// Counts online characters in MySQL.
///
/// Every call opens its own connection, runs one `COUNT(*)` and closes
/// the connection again, on the error path too.
#[derive(Clone)]
pub struct MySqlPlayerStore {
    options: MySqlConnectOptions,
    timeout: Duration,
}

// The connect options carry the password, so they are left out.
impl fmt::Debug for MySqlPlayerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlPlayerStore")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl MySqlPlayerStore {
    /// Creates a store from the exporter's database settings.
    pub fn new(config: &DatabaseConfig) -> Self {
        Self::from_options(config.connect_options(), config.timeout())
    }

    /// Creates a store from prepared connect options.
    pub fn from_options(options: MySqlConnectOptions, timeout: Duration) -> Self {
        Self { options, timeout }
    }

    async fn query_once(&self) -> Result<i64, StoreError> {
        let mut conn = self.options.connect().await.map_err(StoreError::Connect)?;

        let result = sqlx::query_scalar::<_, i64>(ONLINE_PLAYERS_QUERY)
            .fetch_one(&mut conn)
            .await
            .map_err(StoreError::Query);

        if let Err(e) = conn.close().await {
            tracing::debug!(error = %e, "Closing database connection failed");
        }

        result
    }
}

#[async_trait]
impl PlayerStore for MySqlPlayerStore {
    async fn count_online(&self) -> Result<i64, StoreError> {
        let count = tokio::time::timeout(self.timeout, self.query_once())
            .await
            .map_err(|_| StoreError::TimedOut(self.timeout))??;

        if count < 0 {
            return Err(StoreError::NegativeCount(count));
        }
        tracing::trace!(count, "Player count query finished");
        Ok(count)
    }
}
