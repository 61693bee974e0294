//! Host command computation for undo and redo.
//!
//! Logical tool names (`actor_spawn`) map to host command types
//! (`actor.spawn`) through a fixed table. [`inverse_command`] derives the
//! command that reverses a record from its [`UndoData`]; [`replay_command`]
//! re-issues the original tool call.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::CoreError;
use crate::record::{OperationRecord, UndoData};

/// Logical tool name to host command type.
const WIRE_COMMANDS: &[(&str, &str)] = &[
    ("actor_spawn", "actor.spawn"),
    ("actor_delete", "actor.delete"),
    ("actor_modify", "actor.modify"),
    ("actor_duplicate", "actor.duplicate"),
    ("actor_organize", "actor.organize"),
    ("actor_get_state", "actor.get_state"),
    ("material_apply", "material.apply"),
    ("material_create", "material.create"),
    ("level_save", "level.save"),
    ("viewport_camera", "viewport.camera"),
    ("viewport_screenshot", "viewport.screenshot"),
    ("viewport_focus", "viewport.focus"),
    ("viewport_mode", "viewport.mode"),
    ("viewport_render_mode", "viewport.render_mode"),
];

/// Which way a history step moves the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepDirection {
    Undo,
    Redo,
}

impl fmt::Display for StepDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepDirection::Undo => write!(f, "undo"),
            StepDirection::Redo => write!(f, "redo"),
        }
    }
}

/// A concrete request for the host process: `{type, params}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostCommand {
    #[serde(rename = "type")]
    pub command_type: String,
    pub params: Value,
}

impl HostCommand {
    pub fn new(command_type: impl Into<String>, params: Value) -> Self {
        HostCommand {
            command_type: command_type.into(),
            params,
        }
    }
}

/// Looks up the host command type for a logical tool name.
pub fn wire_command(tool: &str) -> Option<&'static str> {
    WIRE_COMMANDS
        .iter()
        .find(|(name, _)| *name == tool)
        .map(|(_, command)| *command)
}

/// All tool names the host understands.
pub fn known_tools() -> impl Iterator<Item = &'static str> {
    WIRE_COMMANDS.iter().map(|(name, _)| *name)
}

fn resolve(tool: &str, direction: StepDirection) -> Result<&'static str, CoreError> {
    wire_command(tool).ok_or_else(|| CoreError::UnsupportedTool {
        tool: tool.to_string(),
        direction,
    })
}

/// Computes the command that reverses `record`.
///
/// Returns `Ok(None)` for checkpoint markers, which have no effect on the host.
pub fn inverse_command(record: &OperationRecord) -> Result<Option<HostCommand>, CoreError> {
    let undo_data = record.undo_data.as_ref().ok_or_else(|| CoreError::NoUndoData {
        tool: record.tool_name.clone(),
    })?;

    let command = match undo_data {
        UndoData::ActorSpawn { actor_name } => HostCommand::new(
            resolve("actor_delete", StepDirection::Undo)?,
            json!({ "actorName": actor_name }),
        ),
        UndoData::ActorDelete { actor_data } => HostCommand::new(
            resolve("actor_spawn", StepDirection::Undo)?,
            json!({
                "assetPath": actor_data.asset_path,
                "location": actor_data.location,
                "rotation": actor_data.rotation,
                "scale": actor_data.scale,
                "name": actor_data.name,
            }),
        ),
        UndoData::ActorModify {
            actor_name,
            previous_state,
        } => {
            let mut params = Map::new();
            params.insert("actorName".into(), json!(actor_name));
            if let Some(location) = previous_state.location {
                params.insert("location".into(), json!(location));
            }
            if let Some(rotation) = previous_state.rotation {
                params.insert("rotation".into(), json!(rotation));
            }
            if let Some(scale) = previous_state.scale {
                params.insert("scale".into(), json!(scale));
            }
            if let Some(mesh) = &previous_state.mesh {
                params.insert("mesh".into(), json!(mesh));
            }
            HostCommand::new(
                resolve("actor_modify", StepDirection::Undo)?,
                Value::Object(params),
            )
        }
        UndoData::MaterialApply {
            actor_name,
            previous_material,
            material_slot,
        } => HostCommand::new(
            resolve("material_apply", StepDirection::Undo)?,
            json!({
                "actorName": actor_name,
                "materialPath": previous_material,
                "slotIndex": material_slot,
            }),
        ),
        UndoData::LevelSave => {
            return Err(CoreError::NotUndoable {
                tool: record.tool_name.clone(),
            })
        }
        UndoData::Custom { .. } => {
            return Err(CoreError::CustomUndoUnsupported {
                tool: record.tool_name.clone(),
            })
        }
        UndoData::Checkpoint { .. } => return Ok(None),
    };

    Ok(Some(command))
}

/// Computes the command that re-applies `record`: its original tool and args.
///
/// Returns `Ok(None)` for checkpoint markers.
pub fn replay_command(record: &OperationRecord) -> Result<Option<HostCommand>, CoreError> {
    if record.is_checkpoint_marker() {
        return Ok(None);
    }
    let command_type = resolve(&record.tool_name, StepDirection::Redo)?;
    Ok(Some(HostCommand::new(command_type, record.args.clone())))
}
