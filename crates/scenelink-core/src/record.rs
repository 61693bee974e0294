//! Operation records and the undo payloads attached to them.
//!
//! An [`OperationRecord`] is appended once a mutating tool call has succeeded
//! against the host process. Its optional [`UndoData`] carries exactly the
//! fields needed to build the inverse command; a record without undo data can
//! never be undone.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::RecordId;

/// A world-space triple: location `[X, Y, Z]`, rotation `[Roll, Pitch, Yaw]`
/// or scale `[X, Y, Z]`.
pub type Vec3 = [f64; 3];

/// Tool name used for checkpoint marker records.
pub const CHECKPOINT_TOOL: &str = "checkpoint_create";

/// Everything needed to re-create a deleted actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorSnapshot {
    pub asset_path: String,
    pub location: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub name: String,
}

/// The fields of an actor as they were before a modification.
///
/// Only fields that were captured are re-applied on undo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousActorState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<String>,
}

impl PreviousActorState {
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.rotation.is_none()
            && self.scale.is_none()
            && self.mesh.is_none()
    }
}

/// What is needed to reverse one operation.
///
/// Serialized as `{"type": "actor_spawn", "actorName": ...}` so orchestrators
/// can submit it verbatim alongside a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum UndoData {
    /// Undo deletes the spawned actor.
    ActorSpawn { actor_name: String },
    /// Undo re-spawns the captured actor.
    ActorDelete { actor_data: ActorSnapshot },
    /// Undo re-applies the previously set fields.
    ActorModify {
        actor_name: String,
        previous_state: PreviousActorState,
    },
    /// Undo re-applies the previous material (possibly none).
    MaterialApply {
        actor_name: String,
        previous_material: Option<String>,
        #[serde(default)]
        material_slot: u32,
    },
    /// Level saves cannot be reversed.
    LevelSave,
    /// Opaque payload without an inverse implementation.
    Custom { custom_data: Value },
    /// Zero-effect checkpoint marker; stepping over it sends nothing.
    Checkpoint { name: String },
}

impl UndoData {
    /// The discriminator string as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            UndoData::ActorSpawn { .. } => "actor_spawn",
            UndoData::ActorDelete { .. } => "actor_delete",
            UndoData::ActorModify { .. } => "actor_modify",
            UndoData::MaterialApply { .. } => "material_apply",
            UndoData::LevelSave => "level_save",
            UndoData::Custom { .. } => "custom",
            UndoData::Checkpoint { .. } => "checkpoint",
        }
    }
}

/// One issued mutating command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    pub id: RecordId,
    pub tool_name: String,
    pub args: Value,
    pub description: String,
    /// ISO 8601 UTC creation time.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undo_data: Option<UndoData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_name: Option<String>,
}

impl OperationRecord {
    /// Creates a record without undo data.
    pub fn new(tool_name: impl Into<String>, args: Value, description: impl Into<String>) -> Self {
        OperationRecord {
            id: RecordId::new(),
            tool_name: tool_name.into(),
            args,
            description: description.into(),
            timestamp: now_iso8601(),
            undo_data: None,
            checkpoint_name: None,
        }
    }

    pub fn with_undo_data(mut self, undo_data: UndoData) -> Self {
        self.undo_data = Some(undo_data);
        self
    }

    /// Creates the marker record logged when a checkpoint is created.
    ///
    /// The description is `Checkpoint: {name}`, suffixed with the user's
    /// description when one is given.
    pub fn checkpoint_marker(name: &str, description: Option<&str>) -> Self {
        let text = match description.map(str::trim).filter(|d| !d.is_empty()) {
            Some(extra) => format!("Checkpoint: {} - {}", name, extra),
            None => format!("Checkpoint: {}", name),
        };
        let mut record = OperationRecord::new(
            CHECKPOINT_TOOL,
            serde_json::json!({ "name": name, "description": description }),
            text,
        );
        record.undo_data = Some(UndoData::Checkpoint {
            name: name.to_string(),
        });
        record.checkpoint_name = Some(name.to_string());
        record
    }

    pub fn is_checkpoint_marker(&self) -> bool {
        self.checkpoint_name.is_some()
    }
}

/// Returns the current UTC time as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn now_iso8601() -> String {
    use std::time::SystemTime;

    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format_unix_seconds(secs)
}

fn format_unix_seconds(secs: u64) -> String {
    let days = secs / 86400;
    let remaining = secs % 86400;
    let (year, month, day) = days_to_date(days);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        remaining / 3600,
        (remaining % 3600) / 60,
        remaining % 60
    )
}

/// Converts days since the Unix epoch to (year, month, day).
fn days_to_date(days: u64) -> (u64, u64, u64) {
    // http://howardhinnant.github.io/date_algorithms.html
    let z = days + 719468;
    let era = z / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if m <= 2 { y + 1 } else { y };
    (year, m, d)
}
