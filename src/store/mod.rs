//! Character database access.
//!
//! The only query the exporter runs is a count of online characters.
//! Failures never escape this module as errors: they become
//! [`PLAYERS_UNKNOWN`], and the caller keeps the previous gauge value.

mod players;

pub use players::{MySqlPlayerStore, PlayerStore, StoreError, PLAYERS_UNKNOWN};
