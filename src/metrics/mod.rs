//! Prometheus metrics exporter for MaNGOS server monitoring.
//!
//! # Metrics Exposed
//!
//! - `wow_server_up` - World server process running (1 = up, 0 = down)
//! - `wow_realm_up` - Realm process running (1 = up, 0 = down)
//! - `wow_players_online` - Characters flagged online in the character
//!   database. Only registered when database integration is enabled.
//!
//! These names are relied on by existing dashboards and alerts and must
//! not change.
//!
//! # Example
//!
//! ```no_run
//! use wow_exporter::metrics::GaugeRegistry;
//!
//! let gauges = GaugeRegistry::new(true).expect("Failed to create registry");
//! gauges.set_server_up(true);
//! gauges.set_realm_up(false);
//! gauges.set_players_online(42);
//!
//! print!("{}", gauges.encode().expect("Failed to encode metrics"));
//! ```

mod collector;
mod server;

#[cfg(test)]
pub(crate) use collector::sample_value;
pub use collector::{GaugeRegistry, MetricsError, PLAYERS_ONLINE, REALM_UP, SERVER_UP};
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
