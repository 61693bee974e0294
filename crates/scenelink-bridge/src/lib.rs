//! Command Bridge to the external editor process.
//!
//! [`HostBridge`] sends `{type, params}` requests to the host listener over
//! HTTP and normalizes the replies into [`CommandOutcome`]s. A background
//! health check keeps a shared [`ConnectionState`] current so that commands
//! fail fast while the host is known to be unreachable and resume on their own
//! once it comes back.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod wire;

pub use client::{ConnectionReport, ConnectionState, HostBridge};
pub use config::BridgeConfig;
pub use dispatch::CommandDispatch;
pub use error::BridgeError;
pub use wire::{CommandOutcome, CommandRequest, HostStatus};
