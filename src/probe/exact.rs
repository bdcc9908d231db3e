//! Exact process-name matching via `pgrep -x`.

use super::process::run_command;
use super::{ProbeError, ProbeStrategy, ProcessProbe};
use async_trait::async_trait;
use std::time::Duration;

/// Exit status `pgrep` uses for "no process matched".
const NO_MATCH_STATUS: i32 = 1;

/// Finds a process by exact name using `pgrep -x -- <name>`.
///
/// Exit status 0 means running and 1 means not running. Anything else,
/// including termination by a signal, is a probe error.
///
/// `pgrep` treats the name as an extended regular expression and matches
/// it against the kernel's `comm`, which Linux truncates to 15 bytes. A
/// longer name never matches and always reads as not running.
#[derive(Debug, Clone)]
pub struct ExactProbe {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ExactProbe {
    /// Creates a probe backed by `pgrep -x`. The `--` keeps names that
    /// start with `-` from being read as options.
    pub fn new(timeout: Duration) -> Self {
        Self::with_command("pgrep", ["-x", "--"], timeout)
    }

    /// Creates a probe with a custom lookup command. The process name is
    /// appended after `args`.
    pub fn with_command<I, S>(program: impl Into<String>, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout,
        }
    }
}

#[async_trait]
impl ProcessProbe for ExactProbe {
    fn strategy(&self) -> ProbeStrategy {
        ProbeStrategy::Exact
    }

    async fn check(&self, process_name: &str) -> Result<bool, ProbeError> {
        let mut args = self.args.clone();
        args.push(process_name.to_string());

        let output = run_command(&self.program, &args, self.timeout).await?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(NO_MATCH_STATUS) => Ok(false),
            _ => Err(ProbeError::UnexpectedStatus {
                program: self.program.clone(),
                status: output.status,
            }),
        }
    }
}
