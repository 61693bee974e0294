//! Batch execution of independent commands.
//!
//! Items run strictly in order against the host (its editor is not
//! thread-safe), but a failed item never stops the ones after it. Batches do
//! not touch the operation history.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use scenelink_bridge::CommandDispatch;
use scenelink_core::wire_command;

/// Operations accepted inside a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOperation {
    ActorSpawn,
    ActorModify,
    ActorDelete,
    ActorDuplicate,
    ViewportCamera,
    ViewportScreenshot,
}

impl BatchOperation {
    pub const ALL: [BatchOperation; 6] = [
        BatchOperation::ActorSpawn,
        BatchOperation::ActorModify,
        BatchOperation::ActorDelete,
        BatchOperation::ActorDuplicate,
        BatchOperation::ViewportCamera,
        BatchOperation::ViewportScreenshot,
    ];

    pub fn tool_name(self) -> &'static str {
        match self {
            BatchOperation::ActorSpawn => "actor_spawn",
            BatchOperation::ActorModify => "actor_modify",
            BatchOperation::ActorDelete => "actor_delete",
            BatchOperation::ActorDuplicate => "actor_duplicate",
            BatchOperation::ViewportCamera => "viewport_camera",
            BatchOperation::ViewportScreenshot => "viewport_screenshot",
        }
    }
}

impl fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tool_name())
    }
}

impl FromStr for BatchOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BatchOperation::ALL
            .into_iter()
            .find(|op| op.tool_name() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = BatchOperation::ALL.iter().map(|op| op.tool_name()).collect();
                format!(
                    "unsupported batch operation '{}'. Allowed: {}",
                    s,
                    allowed.join(", ")
                )
            })
    }
}

/// One validated batch item.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub id: String,
    pub operation: BatchOperation,
    pub params: Value,
}

/// Outcome of one batch item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResult {
    pub id: String,
    pub operation: BatchOperation,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub operations: Vec<BatchItemResult>,
    pub success_count: usize,
    pub failure_count: usize,
    /// Wall-clock time for the whole batch, in milliseconds.
    pub execution_time_ms: f64,
}

impl BatchReport {
    /// Mean time per item in milliseconds, `None` for an empty batch.
    pub fn average_ms(&self) -> Option<f64> {
        let total = self.operations.len();
        (total > 0).then(|| self.execution_time_ms / total as f64)
    }
}

/// Runs every item in order and reports each one.
pub async fn execute_batch<D: CommandDispatch>(bridge: &D, items: Vec<BatchItem>) -> BatchReport {
    let started = Instant::now();
    let mut operations = Vec::with_capacity(items.len());

    for item in items {
        let result = run_item(bridge, item).await;
        if !result.success {
            tracing::debug!(id = %result.id, error = ?result.error, "batch item failed");
        }
        operations.push(result);
    }

    let success_count = operations.iter().filter(|op| op.success).count();
    let report = BatchReport {
        failure_count: operations.len() - success_count,
        success_count,
        operations,
        execution_time_ms: started.elapsed().as_secs_f64() * 1000.0,
    };
    tracing::info!(
        succeeded = report.success_count,
        failed = report.failure_count,
        "batch finished"
    );
    report
}

async fn run_item<D: CommandDispatch>(bridge: &D, item: BatchItem) -> BatchItemResult {
    let BatchItem {
        id,
        operation,
        params,
    } = item;

    let Some(command_type) = wire_command(operation.tool_name()) else {
        return BatchItemResult {
            id,
            operation,
            success: false,
            result: None,
            error: Some(format!("no host command for '{}'", operation)),
        };
    };

    match bridge.execute(command_type, params).await {
        Ok(outcome) if outcome.success => BatchItemResult {
            id,
            operation,
            success: true,
            result: outcome.result,
            error: None,
        },
        Ok(outcome) => BatchItemResult {
            id,
            operation,
            success: false,
            error: Some(outcome.error_message()),
            result: outcome.result,
        },
        Err(err) => BatchItemResult {
            id,
            operation,
            success: false,
            result: None,
            error: Some(err.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::undo::tests::ScriptedBridge;
    use scenelink_bridge::{BridgeError, CommandOutcome};
    use serde_json::json;

    fn item(id: &str, operation: BatchOperation, params: Value) -> BatchItem {
        BatchItem {
            id: id.to_string(),
            operation,
            params,
        }
    }

    #[tokio::test]
    async fn failures_do_not_stop_later_items() {
        let bridge = ScriptedBridge::with_replies([
            Ok(CommandOutcome::ok(json!({ "actorName": "A" }))),
            Ok(CommandOutcome::failed("Asset not found")),
            Ok(CommandOutcome::ok(json!({ "actorName": "C" }))),
        ]);
        let items = vec![
            item("a", BatchOperation::ActorSpawn, json!({ "assetPath": "/Game/A" })),
            item("b", BatchOperation::ActorSpawn, json!({ "assetPath": "/Game/Bad" })),
            item("c", BatchOperation::ActorSpawn, json!({ "assetPath": "/Game/C" })),
        ];

        let report = execute_batch(&bridge, items).await;

        assert_eq!(report.success_count, 2);
        assert_eq!(report.failure_count, 1);
        assert!(report.operations[0].success);
        assert!(!report.operations[1].success);
        assert_eq!(report.operations[1].error.as_deref(), Some("Asset not found"));
        assert!(report.operations[2].success);
        assert_eq!(bridge.calls().len(), 3);
    }

    #[tokio::test]
    async fn transport_errors_are_item_failures() {
        let bridge = ScriptedBridge::with_replies([
            Err(BridgeError::Offline {
                url: "http://localhost:8765".into(),
            }),
            Ok(CommandOutcome::ok(json!({}))),
        ]);
        let items = vec![
            item("op_0", BatchOperation::ViewportCamera, json!({ "location": [0, 0, 500] })),
            item("op_1", BatchOperation::ActorDelete, json!({ "actorName": "A" })),
        ];

        let report = execute_batch(&bridge, items).await;

        assert_eq!(report.failure_count, 1);
        assert!(report.operations[0].error.as_deref().unwrap().contains("offline"));
        assert!(report.operations[1].success);
        assert_eq!(bridge.calls()[0].0, "viewport.camera");
        assert_eq!(bridge.calls()[1].0, "actor.delete");
    }

    #[tokio::test]
    async fn empty_batch_has_no_average() {
        let bridge = ScriptedBridge::accepting();
        let report = execute_batch(&bridge, Vec::new()).await;
        assert_eq!(report.success_count, 0);
        assert_eq!(report.average_ms(), None);
    }

    #[test]
    fn parses_allowed_operations_only() {
        assert_eq!("actor_spawn".parse::<BatchOperation>(), Ok(BatchOperation::ActorSpawn));
        let err = "level_save".parse::<BatchOperation>().unwrap_err();
        assert!(err.contains("Allowed: actor_spawn, actor_modify"));
    }
}
