//! HTTP client for the host listener with passive reconnection.
//!
//! Connection state lives in a `tokio::sync::watch` channel shared by command
//! dispatch and the health check. Neither side holds it across an await: a
//! probe or command does its I/O first and publishes the resulting state
//! afterwards. Probes use their own `reqwest::Client`, so they never queue
//! behind, or reuse a pooled connection of, an in-flight command.
//!
//! Only a refused connection, or a status payload that says so, marks the
//! host offline. A probe that times out leaves the state alone, and a probe
//! whose result lands after a command already published a newer state is
//! discarded.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::wire::{CommandOutcome, CommandRequest, HostStatus};

/// What the bridge currently believes about the host process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Nothing observed yet; commands go to the network.
    Unknown,
    Online,
    /// Last contact failed; commands fail fast until a probe succeeds.
    Offline,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Unknown => write!(f, "unknown"),
            ConnectionState::Online => write!(f, "online"),
            ConnectionState::Offline => write!(f, "offline"),
        }
    }
}

/// Result of an explicit connection test.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub connected: bool,
    pub state: ConnectionState,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<HostStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The one component that talks to the host process.
pub struct HostBridge {
    config: BridgeConfig,
    command_client: reqwest::Client,
    probe_client: reqwest::Client,
    state: watch::Sender<ConnectionState>,
    /// Bumped each time command dispatch publishes a state.
    command_epoch: AtomicU64,
}

impl HostBridge {
    pub fn new(config: BridgeConfig) -> Result<Self, BridgeError> {
        let command_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BridgeError::Transport(format!("failed to build client: {}", e)))?;
        let probe_client = reqwest::Client::builder()
            .timeout(config.probe_timeout)
            .pool_max_idle_per_host(1)
            .build()
            .map_err(|e| BridgeError::Transport(format!("failed to build probe client: {}", e)))?;
        let (state, _) = watch::channel(ConnectionState::Unknown);

        Ok(HostBridge {
            config,
            command_client,
            probe_client,
            state,
            command_epoch: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn url(&self) -> &str {
        &self.config.base_url
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    fn transition(&self, current: &mut ConnectionState, next: ConnectionState) -> bool {
        if *current == next {
            return false;
        }
        tracing::info!(url = %self.config.base_url, from = %current, to = %next, "host connection state changed");
        *current = next;
        true
    }

    /// Publishes a state observed by command dispatch.
    fn set_state(&self, next: ConnectionState) {
        self.state.send_if_modified(|current| {
            self.command_epoch.fetch_add(1, Ordering::SeqCst);
            self.transition(current, next)
        });
    }

    /// Publishes a probe's verdict unless a command has published since
    /// `started` was read.
    fn apply_probe(&self, started: u64, next: ConnectionState) {
        self.state.send_if_modified(|current| {
            if self.command_epoch.load(Ordering::SeqCst) != started {
                tracing::debug!(url = %self.config.base_url, probed = %next, "discarding stale probe result");
                return false;
            }
            self.transition(current, next)
        });
    }

    /// State a probe outcome implies, if any.
    fn probe_verdict(outcome: &Result<HostStatus, BridgeError>) -> Option<ConnectionState> {
        match outcome {
            Ok(status) if status.is_online() => Some(ConnectionState::Online),
            Ok(_) => Some(ConnectionState::Offline),
            Err(err) if err.is_offline() => Some(ConnectionState::Offline),
            Err(_) => None,
        }
    }

    /// Sends one command and waits for its normalized reply.
    ///
    /// Fails fast with [`BridgeError::Offline`] while the host is known to be
    /// unreachable. A refused connection marks the host offline; a timeout
    /// does not, since a busy host is still alive.
    pub async fn execute(
        &self,
        command_type: &str,
        params: Value,
    ) -> Result<CommandOutcome, BridgeError> {
        if self.state() == ConnectionState::Offline {
            return Err(self.offline());
        }

        tracing::debug!(command = command_type, "dispatching host command");
        let request = CommandRequest {
            command_type,
            params: &params,
        };
        let response = self
            .command_client
            .post(&self.config.base_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(command_type, e))?;

        let status = response.status();
        if status == StatusCode::GATEWAY_TIMEOUT {
            // The listener gave up waiting for the editor's main thread.
            return Err(BridgeError::Timeout {
                command: command_type.to_string(),
                after: self.config.request_timeout,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.classify(command_type, e))?;
        self.set_state(ConnectionState::Online);

        let body: Value = serde_json::from_slice(&bytes).map_err(|e| {
            BridgeError::Protocol(format!(
                "{} reply to '{}' is not JSON: {}",
                status, command_type, e
            ))
        })?;
        let outcome = CommandOutcome::from_body(body)?;
        if !outcome.success {
            tracing::debug!(command = command_type, error = ?outcome.error, "host rejected command");
        }
        Ok(outcome)
    }

    fn offline(&self) -> BridgeError {
        BridgeError::Offline {
            url: self.config.base_url.clone(),
        }
    }

    fn classify(&self, command_type: &str, err: reqwest::Error) -> BridgeError {
        if err.is_timeout() {
            BridgeError::Timeout {
                command: command_type.to_string(),
                after: self.config.request_timeout,
            }
        } else if err.is_connect() {
            self.set_state(ConnectionState::Offline);
            self.offline()
        } else {
            BridgeError::Transport(err.to_string())
        }
    }

    /// Fetches the listener's status payload without touching connection state.
    pub async fn probe(&self) -> Result<HostStatus, BridgeError> {
        let response = self
            .probe_client
            .get(&self.config.base_url)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    self.offline()
                } else if e.is_timeout() {
                    BridgeError::Timeout {
                        command: "status".to_string(),
                        after: self.config.probe_timeout,
                    }
                } else {
                    BridgeError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(BridgeError::Protocol(format!(
                "status endpoint answered {}",
                response.status()
            )));
        }
        response
            .json::<HostStatus>()
            .await
            .map_err(|e| BridgeError::Protocol(format!("invalid status payload: {}", e)))
    }

    /// Liveness check that also updates the shared connection state.
    ///
    /// Returns `false` for a probe that timed out or got a malformed reply,
    /// but only a refused connection or an offline payload changes the state.
    pub async fn is_available(&self) -> bool {
        let started = self.command_epoch.load(Ordering::SeqCst);
        let outcome = self.probe().await;
        if let Err(err) = &outcome {
            tracing::debug!(url = %self.config.base_url, error = %err, "host probe failed");
        }
        let verdict = Self::probe_verdict(&outcome);
        if let Some(next) = verdict {
            self.apply_probe(started, next);
        }
        verdict == Some(ConnectionState::Online)
    }

    /// Explicit connection test: probes now and reports what was seen.
    pub async fn test_connection(&self) -> ConnectionReport {
        let started = self.command_epoch.load(Ordering::SeqCst);
        let outcome = self.probe().await;
        if let Some(next) = Self::probe_verdict(&outcome) {
            self.apply_probe(started, next);
        }
        let (connected, host, error) = match outcome {
            Ok(status) if status.is_online() => (true, Some(status), None),
            Ok(status) => {
                let error = format!("host reports status '{}'", status.status);
                (false, Some(status), Some(error))
            }
            Err(err) => (false, None, Some(err.to_string())),
        };

        ConnectionReport {
            connected,
            state: self.state(),
            url: self.config.base_url.clone(),
            host,
            error,
        }
    }

    /// Starts the background health check on the configured interval.
    ///
    /// The task holds only a weak reference and exits once the bridge is
    /// dropped.
    pub fn start_health_check(self: &Arc<Self>) -> JoinHandle<()> {
        let bridge = Arc::downgrade(self);
        let interval = self.config.health_interval;
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                let Some(bridge) = bridge.upgrade() else {
                    break;
                };
                bridge.is_available().await;
            }
        })
    }
}
