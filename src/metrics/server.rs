//! HTTP server for the Prometheus scrape endpoint.

use crate::config::DEFAULT_LISTEN_PORT;
use crate::refresh::Refresher;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Errors that can occur during metrics server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    /// The server stopped with an error.
    #[error("server error: {0}")]
    Server(String),
}

/// Configuration for the metrics server.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self::with_port(DEFAULT_LISTEN_PORT)
    }
}

impl MetricsServerConfig {
    /// Creates a config listening on all interfaces at `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], port).into(),
        }
    }
}

/// HTTP server exposing `GET /metrics`.
///
/// Every scrape runs a full refresh before the gauges are rendered.
pub struct MetricsServer {
    config: MetricsServerConfig,
    refresher: Arc<Refresher>,
}

impl MetricsServer {
    /// Creates a new metrics server.
    pub fn new(config: MetricsServerConfig, refresher: Arc<Refresher>) -> Self {
        Self { config, refresher }
    }

    /// Builds the router serving the scrape endpoint.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(metrics_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::clone(&self.refresher))
    }

    /// Starts the HTTP server and serves until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        tracing::info!(
            addr = %self.config.bind_addr,
            "Metrics server listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Handler for the /metrics endpoint.
async fn metrics_handler(State(refresher): State<Arc<Refresher>>) -> impl IntoResponse {
    // Spawned so the refresh completes even if the scraper disconnects.
    let task = tokio::spawn({
        let refresher = Arc::clone(&refresher);
        async move { refresher.refresh().await }
    });
    if let Err(e) = task.await {
        tracing::error!(error = %e, "Refresh task failed");
    }

    let gauges = refresher.gauges();
    match gauges.encode() {
        Ok(output) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, gauges.content_type())],
            output,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string())],
            format!("Failed to encode metrics: {}", e),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeTargets;
    use crate::metrics::sample_value;
    use crate::refresh::testing::{ScriptedProbe, ScriptedStore};
    use crate::store::PlayerStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn server(probe: ScriptedProbe, store: Option<Arc<ScriptedStore>>) -> MetricsServer {
        let refresher = Refresher::new(
            ProbeTargets::default(),
            Arc::new(probe),
            store.map(|s| s as Arc<dyn PlayerStore>),
        )
        .unwrap();
        MetricsServer::new(MetricsServerConfig::default(), Arc::new(refresher))
    }

    async fn scrape(app: &Router) -> (StatusCode, String, String) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_config_default() {
        let config = MetricsServerConfig::default();
        assert_eq!(config.bind_addr.port(), 9101);
    }

    #[test]
    fn test_config_with_port() {
        let config = MetricsServerConfig::with_port(8080);
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[tokio::test]
    async fn test_server_up_realm_down_store_unreachable() {
        let store = Arc::new(ScriptedStore::unreachable());
        let app = server(ScriptedProbe::running(&["mangosd"]), Some(store)).router();

        let (status, content_type, body) = scrape(&app).await;

        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/plain"));
        assert_eq!(sample_value(&body, "wow_server_up"), Some(1.0));
        assert_eq!(sample_value(&body, "wow_realm_up"), Some(0.0));
        assert_eq!(sample_value(&body, "wow_players_online"), Some(0.0));
    }

    #[tokio::test]
    async fn test_all_up_with_players() {
        let store = Arc::new(ScriptedStore::returning(42));
        let app = server(ScriptedProbe::running(&["mangosd", "realmd"]), Some(store)).router();

        let (status, _, body) = scrape(&app).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(sample_value(&body, "wow_server_up"), Some(1.0));
        assert_eq!(sample_value(&body, "wow_realm_up"), Some(1.0));
        assert_eq!(sample_value(&body, "wow_players_online"), Some(42.0));
    }

    #[tokio::test]
    async fn test_store_outage_keeps_prior_scrape_value() {
        let store = Arc::new(ScriptedStore::returning(12));
        let app = server(ScriptedProbe::running(&["mangosd"]), Some(Arc::clone(&store))).router();

        let (_, _, body) = scrape(&app).await;
        assert_eq!(sample_value(&body, "wow_players_online"), Some(12.0));

        store.set(-1);
        let (status, _, body) = scrape(&app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sample_value(&body, "wow_players_online"), Some(12.0));
    }

    #[tokio::test]
    async fn test_every_scrape_refreshes() {
        let store = Arc::new(ScriptedStore::returning(1));
        let app = server(ScriptedProbe::running(&[]), Some(Arc::clone(&store))).router();

        scrape(&app).await;
        store.set(2);
        let (_, _, body) = scrape(&app).await;
        assert_eq!(sample_value(&body, "wow_players_online"), Some(2.0));
    }

    #[tokio::test]
    async fn test_without_player_count() {
        let app = server(ScriptedProbe::running(&["realmd"]), None).router();

        let (status, _, body) = scrape(&app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sample_value(&body, "wow_realm_up"), Some(1.0));
        assert!(!body.contains("wow_players_online"));
    }

    #[tokio::test]
    async fn test_other_routes_not_found() {
        let app = server(ScriptedProbe::running(&[]), None).router();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bind_failure() {
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut server = server(ScriptedProbe::running(&[]), None);
        server.config.bind_addr = occupied.local_addr().unwrap();

        let result = server.run(std::future::pending()).await;
        assert!(matches!(result, Err(ServerError::Bind(_))));
    }
}
