//! Application state shared by all handlers.
//!
//! [`AppState`] holds the one operation history of this server process behind
//! an `Arc<tokio::sync::Mutex<>>`. Handlers hold the lock across the whole
//! undo, redo, restore or tool call so two requests can never interleave
//! steps on the same cursor. The bridge is shared as-is; its connection state
//! lives in a watch channel and needs no outer lock.

use std::sync::Arc;

use scenelink_bridge::{BridgeConfig, HostBridge};
use scenelink_core::OperationHistory;

use crate::error::ApiError;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// The operation log (async Mutex, awaited without blocking the runtime).
    pub history: Arc<tokio::sync::Mutex<OperationHistory>>,
    /// Client for the host process.
    pub bridge: Arc<HostBridge>,
}

impl AppState {
    /// Creates the state and starts the bridge health check.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(config: BridgeConfig) -> Result<Self, ApiError> {
        let bridge = Arc::new(HostBridge::new(config)?);
        bridge.start_health_check();

        Ok(AppState {
            history: Arc::new(tokio::sync::Mutex::new(OperationHistory::new())),
            bridge,
        })
    }
}
