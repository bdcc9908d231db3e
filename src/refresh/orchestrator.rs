//! Refresh cycle run on every scrape.

use crate::config::{ExporterConfig, ProbeTargets};
use crate::metrics::{GaugeRegistry, MetricsError};
use crate::probe::{build_probe, ProcessProbe};
use crate::store::{MySqlPlayerStore, PlayerStore};
use std::sync::Arc;

/// Result of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Whether the world server process was found.
    pub server_running: bool,
    /// Whether the realm process was found.
    pub realm_running: bool,
    /// Online player count, or `None` when it was unavailable or not tracked.
    pub players_online: Option<i64>,
}

/// Probes both processes, queries the player count and writes the
/// results into the gauge registry.
///
/// One instance is built at startup and shared with the HTTP handler.
pub struct Refresher {
    targets: ProbeTargets,
    probe: Arc<dyn ProcessProbe>,
    store: Option<Arc<dyn PlayerStore>>,
    gauges: Arc<GaugeRegistry>,
}

impl Refresher {
    /// Assembles a refresher from its parts. The player gauge is
    /// registered only when a store is supplied.
    pub fn new(
        targets: ProbeTargets,
        probe: Arc<dyn ProcessProbe>,
        store: Option<Arc<dyn PlayerStore>>,
    ) -> Result<Self, MetricsError> {
        let gauges = Arc::new(GaugeRegistry::new(store.is_some())?);
        Ok(Self {
            targets,
            probe,
            store,
            gauges,
        })
    }

    /// Builds the probe, store and gauges described by `config`.
    pub fn from_config(config: &ExporterConfig) -> Result<Self, MetricsError> {
        let probe = build_probe(&config.probe);
        let store = config
            .database
            .enabled
            .then(|| Arc::new(MySqlPlayerStore::new(&config.database)) as Arc<dyn PlayerStore>);
        Self::new(config.processes.clone(), probe, store)
    }

    /// The gauges this refresher writes to.
    pub fn gauges(&self) -> &Arc<GaugeRegistry> {
        &self.gauges
    }

    /// The monitored process names.
    pub fn targets(&self) -> &ProbeTargets {
        &self.targets
    }

    /// Runs one refresh cycle.
    ///
    /// Every step runs regardless of how the previous ones went. An
    /// unavailable player count leaves `wow_players_online` at its
    /// previous value.
    pub async fn refresh(&self) -> RefreshOutcome {
        let server_running = self.probe.is_running(&self.targets.server).await;
        self.gauges.set_server_up(server_running);

        let realm_running = self.probe.is_running(&self.targets.realm).await;
        self.gauges.set_realm_up(realm_running);

        let players_online = match &self.store {
            Some(store) => {
                let count = store.players_online().await;
                if count >= 0 {
                    self.gauges.set_players_online(count);
                    Some(count)
                } else {
                    None
                }
            }
            None => None,
        };

        let outcome = RefreshOutcome {
            server_running,
            realm_running,
            players_online,
        };
        tracing::debug!(
            server = %self.targets.server,
            server_running,
            realm = %self.targets.realm,
            realm_running,
            players_online = ?players_online,
            "Metrics refreshed"
        );
        outcome
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted probe and store doubles shared by refresh and server tests.

    use crate::probe::{ProbeError, ProbeStrategy, ProcessProbe};
    use crate::store::{PlayerStore, StoreError};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Reports the listed names as running and records every query.
    pub struct ScriptedProbe {
        running: HashSet<String>,
        queried: Mutex<Vec<String>>,
    }

    impl ScriptedProbe {
        pub fn running(names: &[&str]) -> Self {
            Self {
                running: names.iter().map(|n| n.to_string()).collect(),
                queried: Mutex::new(Vec::new()),
            }
        }

        pub fn queried(&self) -> Vec<String> {
            self.queried.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessProbe for ScriptedProbe {
        fn strategy(&self) -> ProbeStrategy {
            ProbeStrategy::Exact
        }

        async fn check(&self, process_name: &str) -> Result<bool, ProbeError> {
            self.queried.lock().unwrap().push(process_name.to_string());
            Ok(self.running.contains(process_name))
        }
    }

    /// Returns a settable count; a negative value simulates an outage.
    pub struct ScriptedStore {
        count: AtomicI64,
    }

    impl ScriptedStore {
        pub fn returning(count: i64) -> Self {
            Self {
                count: AtomicI64::new(count),
            }
        }

        pub fn unreachable() -> Self {
            Self::returning(-1)
        }

        pub fn set(&self, count: i64) {
            self.count.store(count, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl PlayerStore for ScriptedStore {
        async fn count_online(&self) -> Result<i64, StoreError> {
            let count = self.count.load(Ordering::SeqCst);
            if count < 0 {
                return Err(StoreError::TimedOut(Duration::from_secs(5)));
            }
            Ok(count)
        }
    }
}
