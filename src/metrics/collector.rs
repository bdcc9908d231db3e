//! Gauge registry.

use prometheus::{Encoder, Gauge, Registry, TextEncoder};
use thiserror::Error;

/// Metric name of the world server liveness gauge.
pub const SERVER_UP: &str = "wow_server_up";
/// Metric name of the realm liveness gauge.
pub const REALM_UP: &str = "wow_realm_up";
/// Metric name of the online player gauge.
pub const PLAYERS_ONLINE: &str = "wow_players_online";

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed inside `prometheus`.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    /// No gauge with this name is registered.
    #[error("no gauge named {0} is registered")]
    UnknownGauge(String),

    /// The encoder produced bytes that are not UTF-8.
    #[error("encoded metrics are not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// The exporter's gauges, registered once into a private Prometheus registry.
///
/// `prometheus::Gauge` stores its value atomically, so concurrent scrapes
/// can set and gather without further locking. Each gauge is consistent
/// on its own; the set is not updated as a group.
pub struct GaugeRegistry {
    registry: Registry,
    server_up: Gauge,
    realm_up: Gauge,
    players_online: Option<Gauge>,
}

impl GaugeRegistry {
    /// Creates and registers the liveness gauges, plus the player gauge
    /// when `with_players` is set.
    pub fn new(with_players: bool) -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let server_up = Gauge::new(SERVER_UP, "Is the WoW server running (1 = up, 0 = down)")?;
        let realm_up = Gauge::new(REALM_UP, "Is the WoW realm running (1 = up, 0 = down)")?;
        registry.register(Box::new(server_up.clone()))?;
        registry.register(Box::new(realm_up.clone()))?;

        let players_online = if with_players {
            let gauge = Gauge::new(PLAYERS_ONLINE, "Number of players currently online")?;
            registry.register(Box::new(gauge.clone()))?;
            Some(gauge)
        } else {
            None
        };

        Ok(Self {
            registry,
            server_up,
            realm_up,
            players_online,
        })
    }

    /// Sets a gauge by metric name.
    pub fn set(&self, name: &str, value: f64) -> Result<(), MetricsError> {
        let gauge = match name {
            SERVER_UP => &self.server_up,
            REALM_UP => &self.realm_up,
            PLAYERS_ONLINE => self
                .players_online
                .as_ref()
                .ok_or_else(|| MetricsError::UnknownGauge(name.to_string()))?,
            _ => return Err(MetricsError::UnknownGauge(name.to_string())),
        };
        gauge.set(value);
        Ok(())
    }

    /// Records world server liveness.
    pub fn set_server_up(&self, running: bool) {
        self.server_up.set(up_value(running));
    }

    /// Records realm liveness.
    pub fn set_realm_up(&self, running: bool) {
        self.realm_up.set(up_value(running));
    }

    /// Records the online player count. A no-op when the player gauge is
    /// not registered.
    pub fn set_players_online(&self, count: i64) {
        if let Some(gauge) = &self.players_online {
            gauge.set(count as f64);
        }
    }

    /// Current value of `wow_server_up`.
    pub fn server_up(&self) -> f64 {
        self.server_up.get()
    }

    /// Current value of `wow_realm_up`.
    pub fn realm_up(&self) -> f64 {
        self.realm_up.get()
    }

    /// Current value of `wow_players_online`, if registered.
    pub fn players_online(&self) -> Option<f64> {
        self.players_online.as_ref().map(Gauge::get)
    }

    /// Returns true when the player gauge is registered.
    pub fn tracks_players(&self) -> bool {
        self.players_online.is_some()
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Content type of [`encode`](Self::encode) output.
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

fn up_value(running: bool) -> f64 {
    if running {
        1.0
    } else {
        0.0
    }
}

/// Finds the value of an unlabelled sample in Prometheus text output.
#[cfg(test)]
pub(crate) fn sample_value(text: &str, name: &str) -> Option<f64> {
    text.lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let (metric, value) = line.split_once(' ')?;
            (metric == name).then(|| value.trim().parse().ok()).flatten()
        })
}
