//! One-shot tool execution, the producer of the operation log.
//!
//! A tool call is forwarded to the host and, when it is a mutating tool that
//! succeeded, appended to the history together with the undo data needed to
//! reverse it. Undo data comes from the caller when given; otherwise it is
//! derived from the call itself, and for deletes and modifications from an
//! `actor_get_state` snapshot taken right before the command runs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use scenelink_bridge::{CommandDispatch, CommandOutcome};
use scenelink_core::{
    known_tools, wire_command, ActorSnapshot, HistoryStatus, OperationHistory, OperationRecord,
    PreviousActorState, RecordId, UndoData, Vec3,
};

use crate::error::ApiError;

/// Tools whose successful calls are recorded in the history.
const MUTATING_TOOLS: &[&str] = &[
    "actor_spawn",
    "actor_delete",
    "actor_modify",
    "actor_duplicate",
    "actor_organize",
    "material_apply",
    "material_create",
    "level_save",
];

pub fn is_mutating(tool: &str) -> bool {
    MUTATING_TOOLS.contains(&tool)
}

/// A tool invocation as submitted by the orchestrator.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub tool: String,
    pub params: Value,
    pub description: Option<String>,
    pub undo_data: Option<UndoData>,
}

/// Where a successful mutating call landed in the history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedOperation {
    pub index: i64,
    pub record_id: RecordId,
    pub description: String,
    pub undoable: bool,
    /// Caveat about what undoing this record will do, when it is lossy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undo_note: Option<String>,
}

/// Outcome of one tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolReport {
    pub tool: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded: Option<RecordedOperation>,
    pub status: HistoryStatus,
}

/// Actor state as reported by the host's `actor.get_state` command.
#[derive(Debug, Default, Deserialize)]
struct HostActorState {
    location: Option<Vec3>,
    rotation: Option<Vec3>,
    scale: Option<Vec3>,
    mesh: Option<String>,
    asset_path: Option<String>,
}

/// Runs `call` against the host and records it when appropriate.
///
/// Unknown tools are rejected before anything is sent; an unreachable host is
/// an error. A command the host rejects is a normal report with
/// `success: false`, and nothing is recorded for it.
pub async fn execute_tool<D: CommandDispatch>(
    history: &mut OperationHistory,
    bridge: &D,
    call: ToolCall,
) -> Result<ToolReport, ApiError> {
    let command_type = wire_command(&call.tool).ok_or_else(|| {
        let known: Vec<&str> = known_tools().collect();
        ApiError::BadRequest(format!(
            "unknown tool '{}'. Known tools: {}",
            call.tool,
            known.join(", ")
        ))
    })?;
    if !call.params.is_object() {
        return Err(ApiError::BadRequest(format!(
            "params for '{}' must be a JSON object",
            call.tool
        )));
    }

    let snapshot = if call.undo_data.is_none() && needs_snapshot(&call.tool) {
        snapshot_actor(bridge, &call.params).await
    } else {
        None
    };

    let outcome = bridge.execute(command_type, call.params.clone()).await?;
    if !outcome.success || !is_mutating(&call.tool) {
        return Ok(ToolReport {
            tool: call.tool,
            success: outcome.success,
            error: outcome.error,
            result: outcome.result,
            recorded: None,
            status: history.status(),
        });
    }

    let caller_supplied = call.undo_data.is_some();
    let undo_data = call
        .undo_data
        .or_else(|| derive_undo_data(&call.tool, &call.params, snapshot.as_ref(), &outcome));
    let undo_note = if caller_supplied {
        None
    } else {
        undo_data.as_ref().and_then(undo_note)
    };
    let description = call
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| describe(&call.tool, &call.params));

    let mut record = OperationRecord::new(call.tool.clone(), call.params, description.clone());
    let undoable = undo_data.is_some();
    let undo_kind = undo_data.as_ref().map_or("none", UndoData::kind);
    record.undo_data = undo_data;
    let record_id = record.id;
    let index = history.record_operation(record);
    tracing::debug!(tool = %call.tool, index, undo = undo_kind, "operation recorded");

    Ok(ToolReport {
        tool: call.tool,
        success: true,
        result: outcome.result,
        error: None,
        recorded: Some(RecordedOperation {
            index,
            record_id,
            description,
            undoable,
            undo_note,
        }),
        status: history.status(),
    })
}

fn needs_snapshot(tool: &str) -> bool {
    matches!(tool, "actor_delete" | "actor_modify")
}

async fn snapshot_actor<D: CommandDispatch>(bridge: &D, params: &Value) -> Option<HostActorState> {
    let actor_name = params.get("actorName")?.as_str()?;
    let command_type = wire_command("actor_get_state")?;
    let outcome = match bridge
        .execute(command_type, serde_json::json!({ "actorName": actor_name }))
        .await
    {
        Ok(outcome) if outcome.success => outcome,
        Ok(outcome) => {
            tracing::warn!(actor_name, error = ?outcome.error, "actor snapshot failed; operation will not be undoable");
            return None;
        }
        Err(err) => {
            tracing::warn!(actor_name, %err, "actor snapshot failed; operation will not be undoable");
            return None;
        }
    };
    outcome
        .result
        .and_then(|state| serde_json::from_value(state).ok())
}

fn str_param<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

fn has_param(params: &Value, key: &str) -> bool {
    params.get(key).is_some_and(|v| !v.is_null())
}

fn derive_undo_data(
    tool: &str,
    params: &Value,
    snapshot: Option<&HostActorState>,
    outcome: &CommandOutcome,
) -> Option<UndoData> {
    match tool {
        "actor_spawn" | "actor_duplicate" => {
            let actor_name = outcome
                .result_field("actorName")
                .and_then(Value::as_str)
                .or_else(|| str_param(params, "name"))?;
            Some(UndoData::ActorSpawn {
                actor_name: actor_name.to_string(),
            })
        }
        "actor_delete" => {
            let state = snapshot?;
            Some(UndoData::ActorDelete {
                actor_data: ActorSnapshot {
                    asset_path: state.asset_path.clone().or_else(|| state.mesh.clone())?,
                    location: state.location?,
                    rotation: state.rotation?,
                    scale: state.scale?,
                    name: str_param(params, "actorName")?.to_string(),
                },
            })
        }
        "actor_modify" => {
            let state = snapshot?;
            let previous_state = PreviousActorState {
                location: state.location.filter(|_| has_param(params, "location")),
                rotation: state.rotation.filter(|_| has_param(params, "rotation")),
                scale: state.scale.filter(|_| has_param(params, "scale")),
                mesh: state.mesh.clone().filter(|_| has_param(params, "mesh")),
            };
            if previous_state.is_empty() {
                return None;
            }
            Some(UndoData::ActorModify {
                actor_name: str_param(params, "actorName")?.to_string(),
                previous_state,
            })
        }
        "material_apply" => Some(UndoData::MaterialApply {
            actor_name: str_param(params, "actorName")?.to_string(),
            previous_material: None,
            material_slot: params
                .get("slotIndex")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32,
        }),
        "level_save" => Some(UndoData::LevelSave),
        _ => None,
    }
}

/// Warns when derived undo data cannot restore the prior state exactly.
fn undo_note(undo_data: &UndoData) -> Option<String> {
    match undo_data {
        UndoData::MaterialApply {
            previous_material: None,
            material_slot,
            ..
        } => Some(format!(
            "previous material unknown; undo will reset slot {} to its default",
            material_slot
        )),
        _ => None,
    }
}

/// Default human-readable description for a tool call.
fn describe(tool: &str, params: &Value) -> String {
    let actor = str_param(params, "actorName").unwrap_or("actor");
    match tool {
        "actor_spawn" => match str_param(params, "name") {
            Some(name) => format!("Spawn {}", name),
            None => format!("Spawn {}", str_param(params, "assetPath").unwrap_or("actor")),
        },
        "actor_delete" => format!("Delete {}", actor),
        "actor_modify" => format!("Modify {}", actor),
        "actor_duplicate" => format!(
            "Duplicate {}",
            str_param(params, "sourceName").unwrap_or("actor")
        ),
        "material_apply" => format!(
            "Apply {} to {}",
            str_param(params, "materialPath").unwrap_or("material"),
            actor
        ),
        "level_save" => "Save level".to_string(),
        other => other.to_string(),
    }
}
