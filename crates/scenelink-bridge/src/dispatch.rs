//! The seam between history engines and the host transport.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::client::HostBridge;
use crate::error::BridgeError;
use crate::wire::CommandOutcome;

/// Anything that can run a host command and report its outcome.
///
/// [`HostBridge`] is the production implementation; tests substitute scripted
/// dispatchers.
pub trait CommandDispatch: Send + Sync {
    fn execute(
        &self,
        command_type: &str,
        params: Value,
    ) -> impl Future<Output = Result<CommandOutcome, BridgeError>> + Send;
}

impl CommandDispatch for HostBridge {
    fn execute(
        &self,
        command_type: &str,
        params: Value,
    ) -> impl Future<Output = Result<CommandOutcome, BridgeError>> + Send {
        HostBridge::execute(self, command_type, params)
    }
}

impl<T: CommandDispatch> CommandDispatch for Arc<T> {
    fn execute(
        &self,
        command_type: &str,
        params: Value,
    ) -> impl Future<Output = Result<CommandOutcome, BridgeError>> + Send {
        (**self).execute(command_type, params)
    }
}
