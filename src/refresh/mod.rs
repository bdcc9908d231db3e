//! Metrics refresh orchestration.
//!
//! A refresh probes the world server, probes the realm, then counts
//! online players, writing each result into the gauges as it goes.
//! Nothing is cached between scrapes.

mod orchestrator;

#[cfg(test)]
pub(crate) use orchestrator::testing;
pub use orchestrator::{RefreshOutcome, Refresher};
