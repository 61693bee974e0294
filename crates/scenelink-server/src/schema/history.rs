//! Undo/redo, checkpoint and history listing request/response types.

use serde::{Deserialize, Serialize};

use scenelink_core::{HistoryStatus, OperationRecord, RecordId};

use crate::checkpoint::{CheckpointCreated, RestoreReport};
use crate::undo::ChainReport;

/// Request body for `POST /undo` and `POST /redo`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepRequest {
    /// Number of steps, at least 1. Defaults to 1.
    #[serde(default)]
    pub count: Option<usize>,
}

/// Response from an undo or redo chain.
#[derive(Debug, Clone, Serialize)]
pub struct ChainResponse {
    /// Every requested step that was possible completed.
    pub success: bool,
    pub text: String,
    #[serde(flatten)]
    pub report: ChainReport,
}

/// Request to create a named checkpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCheckpointRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCheckpointResponse {
    pub success: bool,
    pub text: String,
    #[serde(flatten)]
    pub checkpoint: CheckpointCreated,
}

/// A view of a named checkpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CheckpointView {
    pub name: String,
    /// Index of the checkpoint's marker record.
    pub index: i64,
    /// Marker description, `Checkpoint: {name}[ - {description}]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListCheckpointsResponse {
    pub text: String,
    pub checkpoints: Vec<CheckpointView>,
    pub status: HistoryStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RestoreCheckpointResponse {
    /// The cursor ended on the checkpoint.
    pub success: bool,
    pub text: String,
    #[serde(flatten)]
    pub report: RestoreReport,
}

/// Query string for `GET /history`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    /// 1..=50, default 10.
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub show_redo: Option<bool>,
}

/// A single entry in a history listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub index: i64,
    pub id: RecordId,
    pub tool_name: String,
    pub description: String,
    pub timestamp: String,
    /// The record carries undo data.
    pub undoable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint_name: Option<String>,
}

impl HistoryEntry {
    pub fn from_record(index: i64, record: &OperationRecord) -> Self {
        HistoryEntry {
            index,
            id: record.id,
            tool_name: record.tool_name.clone(),
            description: record.description.clone(),
            timestamp: record.timestamp.clone(),
            undoable: record.undo_data.is_some(),
            checkpoint_name: record.checkpoint_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListHistoryResponse {
    pub text: String,
    /// Applied records, most recent first.
    pub operations: Vec<HistoryEntry>,
    /// Undone records in redo order, only when `showRedo` was set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redoable: Option<Vec<HistoryEntry>>,
    pub status: HistoryStatus,
}
