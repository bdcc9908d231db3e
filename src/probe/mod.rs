//! Process liveness probing.
//!
//! Two interchangeable strategies answer "is a process with this name
//! running?":
//!
//! - [`SubstringProbe`] scans the output of `ps aux`. It also matches a
//!   name that appears only in another process's arguments.
//! - [`ExactProbe`] asks `pgrep -x`, which only matches whole process names.
//!
//! Exactly one strategy is active per exporter. Probes never fail loudly:
//! any error is logged and reported as "not running".

mod exact;
mod process;
mod substring;

pub use exact::ExactProbe;
pub use process::{build_probe, ProbeError, ProbeStrategy, ProcessProbe};
pub use substring::SubstringProbe;
