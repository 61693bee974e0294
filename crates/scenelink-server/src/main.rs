//! Binary entrypoint for the scenelink HTTP server.
//!
//! Reads configuration from environment variables:
//! - `SCENELINK_PORT`: server listen port (default: 3100)
//! - `SCENELINK_HOST_URL`: editor host listener (default: http://localhost:8765)
//! - `SCENELINK_REQUEST_TIMEOUT_MS`, `SCENELINK_PROBE_TIMEOUT_MS`,
//!   `SCENELINK_HEALTH_INTERVAL_MS`: bridge timings
//! - `RUST_LOG`: log filter (default: info)

use tracing_subscriber::EnvFilter;

use scenelink_server::config::ServerConfig;
use scenelink_server::router::build_router;
use scenelink_server::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    let host_url = config.bridge.base_url.clone();

    let state = AppState::new(config.bridge).expect("Failed to initialize application state");

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(%host_url, "scenelink server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
