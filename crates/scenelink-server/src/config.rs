//! Server configuration from the environment.

use scenelink_bridge::BridgeConfig;

pub const DEFAULT_PORT: u16 = 3100;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub bridge: BridgeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: DEFAULT_PORT,
            bridge: BridgeConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `SCENELINK_PORT` plus the bridge variables.
    pub fn from_env() -> Self {
        let port = match std::env::var("SCENELINK_PORT") {
            Ok(raw) => parse_port(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, default = DEFAULT_PORT, "invalid SCENELINK_PORT, using default");
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };
        ServerConfig {
            port,
            bridge: BridgeConfig::from_env(),
        }
    }
}

fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse().ok().filter(|port| *port > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_must_be_nonzero_u16() {
        assert_eq!(parse_port("8080"), Some(8080));
        assert_eq!(parse_port(" 3100 "), Some(3100));
        assert_eq!(parse_port("0"), None);
        assert_eq!(parse_port("70000"), None);
        assert_eq!(parse_port("http"), None);
    }
}
