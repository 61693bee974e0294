//! The cursor-based operation log.
//!
//! [`OperationHistory`] owns the ordered records, the cursor and the
//! checkpoint bindings. It never talks to the host process: callers peek at
//! the next record to undo or redo, perform the host call themselves, and only
//! then move the cursor with [`OperationHistory::mark_undone`] or
//! [`OperationHistory::mark_redone`].
//!
//! Recording a new operation while the cursor is behind the tail truncates the
//! redoable records and drops every checkpoint that pointed into them.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::CoreError;
use crate::record::OperationRecord;

/// Snapshot of the history position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStatus {
    /// Index of the last applied record, `-1` when nothing is applied.
    pub current_index: i64,
    pub total_operations: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    /// Checkpoint names in creation order.
    pub checkpoints: Vec<String>,
}

impl HistoryStatus {
    /// Number of records that can still be undone.
    pub fn undo_count(&self) -> usize {
        (self.current_index + 1) as usize
    }

    /// Number of records that can be redone.
    pub fn redo_count(&self) -> usize {
        self.total_operations - self.undo_count()
    }
}

/// In-memory log of mutating operations with a cursor and named checkpoints.
#[derive(Debug, Default)]
pub struct OperationHistory {
    records: Vec<OperationRecord>,
    /// Number of applied records; `current_index == applied - 1`.
    applied: usize,
    checkpoints: IndexMap<String, i64>,
}

impl OperationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `record` right after the cursor and moves the cursor onto it.
    ///
    /// Records past the cursor are discarded first, together with any
    /// checkpoint bound to one of them. Returns the new record's index.
    pub fn record_operation(&mut self, record: OperationRecord) -> i64 {
        if self.applied < self.records.len() {
            let discarded = self.records.len() - self.applied;
            self.records.truncate(self.applied);
            let tail = self.current_index();
            let before = self.checkpoints.len();
            self.checkpoints.retain(|_, index| *index <= tail);
            tracing::info!(
                discarded,
                invalidated_checkpoints = before - self.checkpoints.len(),
                "truncated redoable history"
            );
        }
        self.records.push(record);
        self.applied = self.records.len();
        self.current_index()
    }

    /// Binds `name` to the current index.
    ///
    /// Names must be non-empty and unused.
    pub fn create_checkpoint(&mut self, name: &str) -> Result<i64, CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::InvalidCheckpointName);
        }
        if self.checkpoints.contains_key(name) {
            return Err(CoreError::CheckpointExists {
                name: name.to_string(),
            });
        }
        let index = self.current_index();
        self.checkpoints.insert(name.to_string(), index);
        Ok(index)
    }

    pub fn get_checkpoint_index(&self, name: &str) -> Option<i64> {
        self.checkpoints.get(name).copied()
    }

    /// Like [`get_checkpoint_index`](Self::get_checkpoint_index), but unknown
    /// names produce an error listing the known checkpoints.
    pub fn resolve_checkpoint(&self, name: &str) -> Result<i64, CoreError> {
        self.get_checkpoint_index(name)
            .ok_or_else(|| CoreError::CheckpointNotFound {
                name: name.to_string(),
                known: self.checkpoint_names(),
            })
    }

    pub fn checkpoint_names(&self) -> Vec<String> {
        self.checkpoints.keys().cloned().collect()
    }

    /// Checkpoints as `(name, index)` pairs in creation order.
    pub fn checkpoints(&self) -> impl Iterator<Item = (&str, i64)> {
        self.checkpoints.iter().map(|(name, index)| (name.as_str(), *index))
    }

    /// The record the next undo would reverse.
    pub fn get_undoable_operation(&self) -> Option<&OperationRecord> {
        self.applied.checked_sub(1).and_then(|i| self.records.get(i))
    }

    /// The record the next redo would re-apply.
    pub fn get_redoable_operation(&self) -> Option<&OperationRecord> {
        self.records.get(self.applied)
    }

    /// Moves the cursor one step back. Returns `false` if nothing was applied.
    pub fn mark_undone(&mut self) -> bool {
        if self.applied == 0 {
            return false;
        }
        self.applied -= 1;
        true
    }

    /// Moves the cursor one step forward. Returns `false` at the tail.
    pub fn mark_redone(&mut self) -> bool {
        if self.applied >= self.records.len() {
            return false;
        }
        self.applied += 1;
        true
    }

    pub fn current_index(&self) -> i64 {
        self.applied as i64 - 1
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[OperationRecord] {
        &self.records
    }

    /// Up to `limit` applied records, most recent first, with their indices.
    pub fn undoable_window(&self, limit: usize) -> Vec<(i64, &OperationRecord)> {
        self.records[..self.applied]
            .iter()
            .enumerate()
            .rev()
            .take(limit)
            .map(|(i, record)| (i as i64, record))
            .collect()
    }

    /// Up to `limit` redoable records, next-to-redo first, with their indices.
    pub fn redoable_window(&self, limit: usize) -> Vec<(i64, &OperationRecord)> {
        self.records
            .iter()
            .enumerate()
            .skip(self.applied)
            .take(limit)
            .map(|(i, record)| (i as i64, record))
            .collect()
    }

    pub fn status(&self) -> HistoryStatus {
        let current_index = self.current_index();
        let total_operations = self.records.len();
        HistoryStatus {
            current_index,
            total_operations,
            can_undo: current_index >= 0,
            can_redo: current_index < total_operations as i64 - 1,
            checkpoints: self.checkpoint_names(),
        }
    }
}
