//! HTTP/JSON API letting an AI agent drive the editor host with undo, redo,
//! checkpoints and batched commands.
//!
//! The engines (`undo`, `checkpoint`, `batch`, `tools`) are plain async
//! functions over an [`OperationHistory`](scenelink_core::OperationHistory)
//! and any [`CommandDispatch`](scenelink_bridge::CommandDispatch); handlers
//! only validate, lock the history, and render the result.

pub mod batch;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod handlers;
pub mod report;
pub mod router;
pub mod schema;
pub mod state;
pub mod tools;
pub mod undo;
