//! Configuration for the exporter.
//!
//! Process names and database settings come from the same environment
//! variables the MaNGOS monitoring setup has always used. Everything else
//! has a default and may be set from a TOML file or the command line.

mod database;
mod exporter;

pub use database::{redact, DatabaseConfig, PASSWORD_MASK};
pub use exporter::{
    ConfigError, ExporterConfig, ProbeConfig, ProbeTargets, ServerConfig, DEFAULT_LISTEN_PORT,
    MANGOS_PROCESS_NAME, REALM_PROCESS_NAME,
};
