//! The `ProcessProbe` capability and its shared plumbing.

use super::{ExactProbe, SubstringProbe};
use crate::config::ProbeConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::{ExitStatus, Output, Stdio};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Errors that can occur while probing for a process.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The lookup utility could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that was run.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },
    /// The lookup utility exited with a status it never uses for an answer.
    #[error("{program} exited with {status}")]
    UnexpectedStatus {
        /// Program that was run.
        program: String,
        /// Its exit status.
        status: ExitStatus,
    },
    /// The lookup utility was killed after running too long.
    #[error("{program} did not finish within {timeout:?}")]
    TimedOut {
        /// Program that was run.
        program: String,
        /// Bound that elapsed.
        timeout: Duration,
    },
}

/// Selects how process names are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStrategy {
    /// Substring search over a full `ps aux` listing.
    Substring,
    /// Exact process-name match via `pgrep -x`.
    Exact,
}

impl fmt::Display for ProbeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Substring => f.write_str("substring"),
            Self::Exact => f.write_str("exact"),
        }
    }
}

/// Reports whether a named OS process is running.
///
/// Implementors provide [`check`](ProcessProbe::check). Callers use
/// [`is_running`](ProcessProbe::is_running), which never fails: errors are
/// logged and reported as "not running".
#[async_trait]
pub trait ProcessProbe: Send + Sync {
    /// The matching strategy this probe implements.
    fn strategy(&self) -> ProbeStrategy;

    /// Checks for the process, surfacing any failure of the OS facility.
    async fn check(&self, process_name: &str) -> Result<bool, ProbeError>;

    /// Checks for the process, treating failures as "not running".
    async fn is_running(&self, process_name: &str) -> bool {
        match self.check(process_name).await {
            Ok(running) => running,
            Err(e) => {
                tracing::error!(
                    process = process_name,
                    strategy = %self.strategy(),
                    error = %e,
                    "Process probe failed, reporting not running"
                );
                false
            }
        }
    }
}

/// Builds the probe selected by `config`.
pub fn build_probe(config: &ProbeConfig) -> Arc<dyn ProcessProbe> {
    match config.strategy {
        ProbeStrategy::Substring => Arc::new(SubstringProbe::new(config.timeout())),
        ProbeStrategy::Exact => Arc::new(ExactProbe::new(config.timeout())),
    }
}

/// Runs `program` to completion, killing it if `timeout` elapses first.
pub(super) async fn run_command(
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<Output, ProbeError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(ProbeError::Spawn {
            program: program.to_string(),
            source,
        }),
        Err(_) => Err(ProbeError::TimedOut {
            program: program.to_string(),
            timeout,
        }),
    }
}
