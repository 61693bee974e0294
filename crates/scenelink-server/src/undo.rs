//! Undo and redo engines.
//!
//! Each step peeks at the next record, computes the host command (the inverse
//! for undo, the original tool call for redo), dispatches it, and moves the
//! history cursor only once the host confirmed success. Chains stop at the
//! first failed step: skipping a step would leave the log describing a scene
//! the host no longer has.

use serde::Serialize;

use scenelink_bridge::CommandDispatch;
use scenelink_core::{
    inverse_command, replay_command, HistoryStatus, HostCommand, OperationHistory,
    OperationRecord, RecordId, StepDirection,
};

/// A record that was stepped over (or attempted).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEntry {
    pub index: i64,
    pub record_id: RecordId,
    pub tool_name: String,
    pub description: String,
}

impl StepEntry {
    fn from_record(index: i64, record: &OperationRecord) -> Self {
        StepEntry {
            index,
            record_id: record.id,
            tool_name: record.tool_name.clone(),
            description: record.description.clone(),
        }
    }
}

/// A step that could not be completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepFailure {
    #[serde(flatten)]
    pub step: StepEntry,
    pub error: String,
    /// The host was unreachable rather than rejecting the command.
    pub bridge_offline: bool,
}

/// Outcome of a single undo or redo step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    Done(StepEntry),
    /// Nothing left in this direction.
    Exhausted,
    Failed(StepFailure),
}

/// Report of an undo or redo chain.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReport {
    pub direction: StepDirection,
    pub requested: usize,
    pub completed: Vec<StepEntry>,
    /// At most one failure, since chains stop at the first.
    pub failed: Vec<StepFailure>,
    pub status: HistoryStatus,
}

/// Undoes the most recent applied record.
pub async fn undo_step<D: CommandDispatch>(
    history: &mut OperationHistory,
    bridge: &D,
) -> StepResult {
    step(history, bridge, StepDirection::Undo).await
}

/// Re-applies the next undone record.
pub async fn redo_step<D: CommandDispatch>(
    history: &mut OperationHistory,
    bridge: &D,
) -> StepResult {
    step(history, bridge, StepDirection::Redo).await
}

/// Attempts up to `count` undos, stopping at the first failure.
pub async fn undo<D: CommandDispatch>(
    history: &mut OperationHistory,
    bridge: &D,
    count: usize,
) -> ChainReport {
    chain(history, bridge, StepDirection::Undo, count).await
}

/// Attempts up to `count` redos, stopping at the first failure.
pub async fn redo<D: CommandDispatch>(
    history: &mut OperationHistory,
    bridge: &D,
    count: usize,
) -> ChainReport {
    chain(history, bridge, StepDirection::Redo, count).await
}

async fn chain<D: CommandDispatch>(
    history: &mut OperationHistory,
    bridge: &D,
    direction: StepDirection,
    count: usize,
) -> ChainReport {
    let mut completed = Vec::new();
    let mut failed = Vec::new();

    for _ in 0..count {
        match step(history, bridge, direction).await {
            StepResult::Done(entry) => completed.push(entry),
            StepResult::Exhausted => break,
            StepResult::Failed(failure) => {
                failed.push(failure);
                break;
            }
        }
    }

    ChainReport {
        direction,
        requested: count,
        completed,
        failed,
        status: history.status(),
    }
}

pub(crate) async fn step<D: CommandDispatch>(
    history: &mut OperationHistory,
    bridge: &D,
    direction: StepDirection,
) -> StepResult {
    let (index, record) = match direction {
        StepDirection::Undo => (history.current_index(), history.get_undoable_operation()),
        StepDirection::Redo => (history.current_index() + 1, history.get_redoable_operation()),
    };
    let Some(record) = record else {
        return StepResult::Exhausted;
    };
    let entry = StepEntry::from_record(index, record);

    let command = match direction {
        StepDirection::Undo => inverse_command(record),
        StepDirection::Redo => replay_command(record),
    };
    let command = match command {
        Ok(command) => command,
        Err(err) => return fail(entry, direction, err.to_string(), false),
    };

    if let Some(HostCommand {
        command_type,
        params,
    }) = command
    {
        match bridge.execute(&command_type, params).await {
            Ok(outcome) if outcome.success => {}
            Ok(outcome) => return fail(entry, direction, outcome.error_message(), false),
            Err(err) => {
                let offline = err.is_offline();
                return fail(entry, direction, err.to_string(), offline);
            }
        }
    }

    let moved = match direction {
        StepDirection::Undo => history.mark_undone(),
        StepDirection::Redo => history.mark_redone(),
    };
    debug_assert!(moved, "cursor must move after a confirmed step");
    tracing::debug!(%direction, index, tool = %entry.tool_name, "history step applied");
    StepResult::Done(entry)
}

fn fail(entry: StepEntry, direction: StepDirection, error: String, bridge_offline: bool) -> StepResult {
    tracing::warn!(%direction, index = entry.index, tool = %entry.tool_name, %error, "history step failed");
    StepResult::Failed(StepFailure {
        step: entry,
        error,
        bridge_offline,
    })
}
