//! WoW Exporter CLI
//!
//! Serves MaNGOS liveness and online player metrics on `/metrics` for
//! Prometheus to scrape.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{error, info, warn};
use wow_exporter::{
    config::{ConfigError, ExporterConfig},
    metrics::{MetricsServer, MetricsServerConfig},
    probe::ProbeStrategy,
    refresh::Refresher,
};

#[derive(Parser)]
#[command(name = "wow-exporter")]
#[command(version)]
#[command(about = "Prometheus exporter for MaNGOS server liveness and online players")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for the /metrics endpoint [default: 9101]
    #[arg(short, long)]
    port: Option<u16>,

    /// How process names are matched
    #[arg(long, value_enum)]
    probe_strategy: Option<ProbeStrategy>,

    /// Timeout for a single process probe, in seconds
    #[arg(long)]
    probe_timeout_secs: Option<u64>,

    /// Timeout for the player count query, in seconds
    #[arg(long)]
    db_timeout_secs: Option<u64>,

    /// Do not query the character database or export wow_players_online
    #[arg(long)]
    no_player_count: bool,
}

impl Cli {
    fn load_config(&self) -> Result<ExporterConfig, ConfigError> {
        let mut config = ExporterConfig::load(self.config.as_deref())?;

        if let Some(port) = self.port {
            config.server.listen_port = port;
        }
        if let Some(strategy) = self.probe_strategy {
            config.probe.strategy = strategy;
        }
        if let Some(secs) = self.probe_timeout_secs {
            config.probe.timeout_secs = secs;
        }
        if let Some(secs) = self.db_timeout_secs {
            config.database.timeout_secs = secs;
        }
        if self.no_player_count {
            config.database.enabled = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "WoW Exporter v{} starting on :{}",
        wow_exporter::VERSION,
        config.server.listen_port
    );
    info!(
        "Monitoring processes: {}, {} (strategy: {})",
        config.processes.server, config.processes.realm, config.probe.strategy
    );
    if config.database.enabled {
        info!("MySQL DSN: {}", config.database.redacted_descriptor());
    } else {
        info!("Player count disabled, not querying the character database");
    }

    let refresher = match Refresher::from_config(&config) {
        Ok(refresher) => Arc::new(refresher),
        Err(e) => {
            error!("Failed to register metrics: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown = Arc::new(Notify::new());
    {
        let shutdown = Arc::clone(&shutdown);
        if let Err(e) = ctrlc::set_handler(move || shutdown.notify_one()) {
            warn!("Failed to install signal handler: {}", e);
        }
    }

    let server = MetricsServer::new(
        MetricsServerConfig::with_port(config.server.listen_port),
        refresher,
    );
    let result = server
        .run(async move {
            shutdown.notified().await;
            info!("Shutdown requested");
        })
        .await;

    if let Err(e) = result {
        error!("Metrics server failed: {}", e);
        std::process::exit(1);
    }

    info!("Done.");
}
