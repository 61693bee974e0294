//! Named checkpoints over the operation history.
//!
//! Creating a checkpoint appends a zero-effect marker record and binds the
//! name to the marker's index. Restoring walks the cursor to that index one
//! undo or redo step at a time, with the same stop-at-first-failure rule as
//! plain undo/redo.

use serde::Serialize;

use scenelink_bridge::CommandDispatch;
use scenelink_core::{CoreError, HistoryStatus, OperationHistory, OperationRecord, StepDirection};

use crate::undo::{step, StepEntry, StepFailure, StepResult};

/// Result of creating a checkpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointCreated {
    pub name: String,
    pub index: i64,
    pub timestamp: String,
    pub checkpoint_count: usize,
    pub status: HistoryStatus,
}

/// Result of restoring a checkpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub name: String,
    pub target_index: i64,
    /// `None` when the cursor already was at the checkpoint.
    pub direction: Option<StepDirection>,
    /// Steps needed to reach the checkpoint.
    pub requested: usize,
    pub undone: Vec<StepEntry>,
    pub redone: Vec<StepEntry>,
    pub failed: Option<StepFailure>,
    pub status: HistoryStatus,
}

impl RestoreReport {
    pub fn already_there(&self) -> bool {
        self.direction.is_none()
    }

    /// Whether the cursor ended on the checkpoint.
    pub fn reached(&self) -> bool {
        self.status.current_index == self.target_index
    }
}

/// Creates a named checkpoint at the current position.
///
/// Fails before touching the log when the name is empty or taken.
pub fn create(
    history: &mut OperationHistory,
    name: &str,
    description: Option<&str>,
) -> Result<CheckpointCreated, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::InvalidCheckpointName);
    }
    if history.get_checkpoint_index(name).is_some() {
        return Err(CoreError::CheckpointExists {
            name: name.to_string(),
        });
    }

    let marker = OperationRecord::checkpoint_marker(name, description);
    let timestamp = marker.timestamp.clone();
    history.record_operation(marker);
    let index = history.create_checkpoint(name)?;
    tracing::info!(name, index, "checkpoint created");

    let status = history.status();
    Ok(CheckpointCreated {
        name: name.to_string(),
        index,
        timestamp,
        checkpoint_count: status.checkpoints.len(),
        status,
    })
}

/// Moves the history cursor back or forward to the named checkpoint.
///
/// Unknown names are an error listing the known checkpoints. Step failures
/// are not errors: the walk stops and the report says how far it got.
pub async fn restore<D: CommandDispatch>(
    history: &mut OperationHistory,
    bridge: &D,
    name: &str,
) -> Result<RestoreReport, CoreError> {
    let target_index = history.resolve_checkpoint(name)?;
    let delta = target_index - history.current_index();
    let direction = match delta {
        0 => None,
        d if d < 0 => Some(StepDirection::Undo),
        _ => Some(StepDirection::Redo),
    };
    let requested = delta.unsigned_abs() as usize;

    let mut done = Vec::new();
    let mut failed = None;
    if let Some(direction) = direction {
        for _ in 0..requested {
            match step(history, bridge, direction).await {
                StepResult::Done(entry) => done.push(entry),
                StepResult::Exhausted => break,
                StepResult::Failed(failure) => {
                    failed = Some(failure);
                    break;
                }
            }
        }
    }

    let (undone, redone) = match direction {
        Some(StepDirection::Undo) => (done, Vec::new()),
        _ => (Vec::new(), done),
    };
    let report = RestoreReport {
        name: name.to_string(),
        target_index,
        direction,
        requested,
        undone,
        redone,
        failed,
        status: history.status(),
    };
    tracing::info!(
        name,
        target_index,
        reached = report.reached(),
        steps = report.undone.len() + report.redone.len(),
        "checkpoint restore finished"
    );
    Ok(report)
}
