//! Bridge configuration.

use std::time::Duration;

/// Default address of the editor listener.
pub const DEFAULT_HOST_URL: &str = "http://localhost:8765";

/// Connection settings for [`HostBridge`](crate::client::HostBridge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Listener base URL; commands are POSTed and probes are GETs against it.
    pub base_url: String,
    /// Upper bound for one command round trip.
    pub request_timeout: Duration,
    /// Upper bound for one liveness probe.
    pub probe_timeout: Duration,
    /// Period of the background health check.
    pub health_interval: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            base_url: DEFAULT_HOST_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(2),
            health_interval: Duration::from_secs(5),
        }
    }
}

impl BridgeConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        BridgeConfig {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Reads configuration from environment variables:
    /// - `SCENELINK_HOST_URL` (default: "http://localhost:8765")
    /// - `SCENELINK_REQUEST_TIMEOUT_MS` (default: 10000)
    /// - `SCENELINK_PROBE_TIMEOUT_MS` (default: 2000)
    /// - `SCENELINK_HEALTH_INTERVAL_MS` (default: 5000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        BridgeConfig {
            base_url: std::env::var("SCENELINK_HOST_URL").unwrap_or(defaults.base_url),
            request_timeout: millis_var("SCENELINK_REQUEST_TIMEOUT_MS", defaults.request_timeout),
            probe_timeout: millis_var("SCENELINK_PROBE_TIMEOUT_MS", defaults.probe_timeout),
            health_interval: millis_var("SCENELINK_HEALTH_INTERVAL_MS", defaults.health_interval),
        }
    }
}

fn millis_var(name: &str, default: Duration) -> Duration {
    match std::env::var(name) {
        Ok(raw) => parse_millis(&raw).unwrap_or_else(|| {
            tracing::warn!("ignoring invalid {}={:?}, using {}ms", name, raw, default.as_millis());
            default
        }),
        Err(_) => default,
    }
}

fn parse_millis(raw: &str) -> Option<Duration> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}
