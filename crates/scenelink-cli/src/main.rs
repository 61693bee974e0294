//! Operator CLI for the editor host listener.
//!
//! Provides the `scenelink` binary, which talks to the host process directly
//! through the same `HostBridge` the server uses: `ping` probes it once,
//! `exec` sends a single command, and `watch` follows the health check.
//! Results go to stdout as JSON; logs go to stderr.

use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scenelink_bridge::{BridgeConfig, ConnectionState, HostBridge};

/// Talk to a running editor host listener.
#[derive(Parser)]
#[command(name = "scenelink", about = "Talk to a running editor host listener")]
struct Cli {
    #[command(flatten)]
    host: HostArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct HostArgs {
    /// Base URL of the host listener.
    #[arg(long, env = "SCENELINK_HOST_URL", default_value = scenelink_bridge::config::DEFAULT_HOST_URL)]
    url: String,

    /// Per-command timeout in milliseconds.
    #[arg(long, env = "SCENELINK_REQUEST_TIMEOUT_MS", default_value_t = 10_000)]
    timeout_ms: u64,

    /// Liveness probe timeout in milliseconds.
    #[arg(long, env = "SCENELINK_PROBE_TIMEOUT_MS", default_value_t = 2_000)]
    probe_timeout_ms: u64,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Probe the host once. Exits 0 when online, 1 otherwise.
    Ping,

    /// Send one command and print the normalized outcome.
    Exec {
        /// Host command type, e.g. `actor.spawn`.
        command_type: String,

        /// Command parameters as a JSON object.
        #[arg(short, long, default_value = "{}")]
        params: String,
    },

    /// Print every online/offline transition until interrupted.
    Watch {
        /// Health-check period in milliseconds.
        #[arg(long, env = "SCENELINK_HEALTH_INTERVAL_MS", default_value_t = 5_000)]
        interval_ms: u64,
    },
}

impl HostArgs {
    fn config(&self, health_interval: Option<Duration>) -> BridgeConfig {
        let defaults = BridgeConfig::with_base_url(self.url.clone());
        BridgeConfig {
            request_timeout: Duration::from_millis(self.timeout_ms.max(1)),
            probe_timeout: Duration::from_millis(self.probe_timeout_ms.max(1)),
            health_interval: health_interval.unwrap_or(defaults.health_interval),
            ..defaults
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Ping => run_ping(cli.host.config(None)).await,
        Commands::Exec {
            command_type,
            params,
        } => run_exec(cli.host.config(None), &command_type, &params).await,
        Commands::Watch { interval_ms } => {
            let interval = Duration::from_millis(interval_ms.max(1));
            run_watch(cli.host.config(Some(interval))).await
        }
    };
    process::exit(exit_code);
}

fn connect(config: BridgeConfig) -> Result<HostBridge, i32> {
    HostBridge::new(config).map_err(|e| {
        eprintln!("Error: failed to create bridge: {}", e);
        3
    })
}

/// Execute the ping subcommand.
///
/// Returns exit code: 0 = online, 1 = offline or unhealthy.
async fn run_ping(config: BridgeConfig) -> i32 {
    let bridge = match connect(config) {
        Ok(b) => b,
        Err(code) => return code,
    };

    let report = bridge.test_connection().await;
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: {}", e),
    }
    if report.connected {
        0
    } else {
        1
    }
}

/// Execute the exec subcommand.
///
/// Returns exit code: 0 = success, 1 = command failed, 2 = host offline,
/// 3 = invalid input or other transport problem.
async fn run_exec(config: BridgeConfig, command_type: &str, params: &str) -> i32 {
    let params: serde_json::Value = match serde_json::from_str(params) {
        Ok(value @ serde_json::Value::Object(_)) => value,
        Ok(_) => {
            eprintln!("Error: --params must be a JSON object");
            return 3;
        }
        Err(e) => {
            eprintln!("Error: invalid --params JSON: {}", e);
            return 3;
        }
    };
    let bridge = match connect(config) {
        Ok(b) => b,
        Err(code) => return code,
    };

    match bridge.execute(command_type, params).await {
        Ok(outcome) => {
            match serde_json::to_string_pretty(&outcome) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error: {}", e),
            }
            if outcome.success {
                0
            } else {
                1
            }
        }
        Err(e) if e.is_offline() => {
            eprintln!("Error: {}", e);
            2
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            3
        }
    }
}

/// Execute the watch subcommand. Runs until Ctrl-C.
async fn run_watch(config: BridgeConfig) -> i32 {
    let bridge = match connect(config) {
        Ok(b) => Arc::new(b),
        Err(code) => return code,
    };
    println!("watching {} (Ctrl-C to stop)", bridge.url());

    let mut states = bridge.subscribe();
    let health = bridge.start_health_check();
    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                if let Some(line) = transition_line(bridge.url(), state) {
                    println!("{}", line);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    health.abort();
    tracing::debug!(url = bridge.url(), "watch stopped");
    0
}

/// Line printed for an observed state, logged at `info` as well.
fn transition_line(url: &str, state: ConnectionState) -> Option<String> {
    if state == ConnectionState::Unknown {
        return None;
    }
    tracing::info!(url, %state, "host connection state observed");
    Some(state.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_prints_only_known_states() {
        let url = "http://localhost:8765";
        assert_eq!(transition_line(url, ConnectionState::Unknown), None);
        assert_eq!(transition_line(url, ConnectionState::Online).as_deref(), Some("online"));
        assert_eq!(transition_line(url, ConnectionState::Offline).as_deref(), Some("offline"));
    }
}
