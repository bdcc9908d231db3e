//! Substring matching over a full process listing.

use super::process::run_command;
use super::{ProbeError, ProbeStrategy, ProcessProbe};
use async_trait::async_trait;
use std::time::Duration;

/// Finds a process by searching the `ps aux` listing for its name.
///
/// The whole listing is searched, command lines and arguments included,
/// so `realmd` also matches `mangosd -c /etc/realmd.conf`. That false
/// positive is accepted; use [`ExactProbe`](super::ExactProbe) when it
/// matters.
#[derive(Debug, Clone)]
pub struct SubstringProbe {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl SubstringProbe {
    /// Creates a probe that lists processes with `ps aux`.
    pub fn new(timeout: Duration) -> Self {
        Self::with_command("ps", ["aux"], timeout)
    }

    /// Creates a probe that uses a custom listing command.
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
impl ProcessProbe for SubstringProbe {
    fn strategy(&self) -> ProbeStrategy {
        ProbeStrategy::Substring
    }

    async fn check(&self, process_name: &str) -> Result<bool, ProbeError> {
        let output = run_command(&self.program, &self.args, self.timeout).await?;
        if !output.status.success() {
            return Err(ProbeError::UnexpectedStatus {
                program: self.program.clone(),
                status: output.status,
            });
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        let running = listing.contains(process_name);
        tracing::trace!(process = process_name, running, "Substring probe finished");
        Ok(running)
    }
}

#[cfg(test)]
mod tests {
    use super::super::process::live::{absent_name, LiveProcess};
    use super::*;

    const LISTING: &str = "root 1 init\n\
                           mangos 812 /opt/mangos/bin/mangosd -c /etc/realmd.conf\n";

    fn listing_probe() -> SubstringProbe {
        SubstringProbe::with_command("echo", [LISTING], Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_finds_listed_process() {
        assert!(listing_probe().is_running("mangosd").await);
    }

    #[tokio::test]
    async fn test_absent_process() {
        assert!(!listing_probe().is_running("worldserver").await);
    }

    #[tokio::test]
    async fn test_name_in_arguments_matches() {
        // Known imprecision: realmd is not running, but its name appears
        // in mangosd's arguments.
        assert!(listing_probe().is_running("realmd").await);
    }

    #[tokio::test]
    async fn test_missing_utility_reports_not_running() {
        let probe = SubstringProbe::with_command(
            "wow-exporter-no-such-ps",
            ["aux"],
            Duration::from_secs(5),
        );
        assert!(matches!(
            probe.check("mangosd").await,
            Err(ProbeError::Spawn { .. })
        ));
        assert!(!probe.is_running("mangosd").await);
    }

    #[tokio::test]
    async fn test_failing_listing_reports_not_running() {
        let probe =
            SubstringProbe::with_command("false", Vec::<String>::new(), Duration::from_secs(5));
        assert!(matches!(
            probe.check("mangosd").await,
            Err(ProbeError::UnexpectedStatus { .. })
        ));
        assert!(!probe.is_running("mangosd").await);
    }

    #[tokio::test]
    async fn test_running_process_found_by_ps() {
        let process = LiveProcess::spawn("wowsub").await;
        let lookup = SubstringProbe::new(Duration::from_secs(5));

        assert!(matches!(lookup.check(&process.name).await, Ok(true)));
        assert!(matches!(lookup.check(&absent_name()).await, Ok(false)));
    }
}
