//! Core error types for scenelink-core.
//!
//! Uses `thiserror` for structured, matchable variants covering every reason
//! an undo/redo step or a checkpoint request can be refused before anything is
//! sent to the host process.

use thiserror::Error;

use crate::command::StepDirection;

/// Errors produced by history bookkeeping and command computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The record was logged without undo data; it is a permanent undo barrier.
    #[error("no undo data for operation '{tool}'")]
    NoUndoData { tool: String },

    /// Saving a level cannot be reversed.
    #[error("no undo data for operation '{tool}': level saves are not undoable")]
    NotUndoable { tool: String },

    /// Custom undo payloads are accepted but have no inverse implementation.
    #[error("custom undo for '{tool}' is not implemented")]
    CustomUndoUnsupported { tool: String },

    /// The tool has no entry in the wire command table.
    #[error("operation '{tool}' is not supported for {direction}")]
    UnsupportedTool {
        tool: String,
        direction: StepDirection,
    },

    /// Checkpoint names must contain at least one non-whitespace character.
    #[error("checkpoint name must not be empty")]
    InvalidCheckpointName,

    /// A checkpoint with this name already exists.
    #[error("checkpoint '{name}' already exists")]
    CheckpointExists { name: String },

    /// No checkpoint has this name.
    #[error("checkpoint '{name}' not found. {}", known_list(.known))]
    CheckpointNotFound { name: String, known: Vec<String> },
}

fn known_list(known: &[String]) -> String {
    if known.is_empty() {
        "No checkpoints exist".to_string()
    } else {
        format!("Available checkpoints: {}", known.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_lists_known_checkpoints() {
        let err = CoreError::CheckpointNotFound {
            name: "c9".into(),
            known: vec!["c1".into(), "c2".into()],
        };
        assert_eq!(
            err.to_string(),
            "checkpoint 'c9' not found. Available checkpoints: c1, c2"
        );
    }

    #[test]
    fn not_found_without_checkpoints() {
        let err = CoreError::CheckpointNotFound {
            name: "c1".into(),
            known: Vec::new(),
        };
        assert_eq!(err.to_string(), "checkpoint 'c1' not found. No checkpoints exist");
    }
}
