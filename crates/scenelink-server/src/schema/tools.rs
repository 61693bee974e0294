//! Tool execution request/response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use scenelink_core::UndoData;

use crate::tools::ToolReport;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolRequest {
    /// Tool parameters, an empty object when omitted.
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    /// Caller-supplied undo data, used instead of the automatic capture.
    #[serde(default)]
    pub undo_data: Option<UndoData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolResponse {
    pub text: String,
    #[serde(flatten)]
    pub report: ToolReport,
}
