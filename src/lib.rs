//! WoW Exporter Library
//!
//! A Prometheus exporter for a MaNGOS server pair. It reports whether the
//! world server (`mangosd`) and the realm server (`realmd`) are running,
//! and how many characters are online according to the character database.
//!
//! # Architecture
//!
//! Every scrape runs the whole pipeline again; nothing is cached:
//!
//! ```text
//! GET /metrics → refresh → probe (server, realm) → store (player count)
//!                   ↓
//!             gauge registry → text exposition → response
//! ```
//!
//! # Design Principles
//!
//! - **Scrapes never fail**: probe and database errors are logged, and the
//!   scrape still returns the last known gauge values
//! - **No shared globals**: the [`Refresher`] context owns the gauges and
//!   collaborators and is handed to the HTTP handler
//! - **Bounded external calls**: process probes and the database round trip
//!   are both subject to timeouts
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wow_exporter::{ExporterConfig, MetricsServer, MetricsServerConfig, Refresher};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExporterConfig::load(None)?;
//! config.validate()?;
//!
//! let refresher = Arc::new(Refresher::from_config(&config)?);
//! let outcome = refresher.refresh().await;
//! println!("server running: {}", outcome.server_running);
//!
//! let server = MetricsServer::new(
//!     MetricsServerConfig::with_port(config.server.listen_port),
//!     refresher,
//! );
//! server.run(std::future::pending()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod metrics;
pub mod probe;
pub mod refresh;
pub mod store;

// Re-export commonly used types at crate root
pub use config::{ConfigError, DatabaseConfig, ExporterConfig, ProbeTargets};
pub use metrics::{GaugeRegistry, MetricsServer, MetricsServerConfig};
pub use probe::{ExactProbe, ProbeStrategy, ProcessProbe, SubstringProbe};
pub use refresh::{RefreshOutcome, Refresher};
pub use store::{MySqlPlayerStore, PlayerStore, PLAYERS_UNKNOWN};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
