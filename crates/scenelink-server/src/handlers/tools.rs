//! Tool execution handler, the producer of history records.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;

use crate::error::ApiError;
use crate::handlers::optional_body;
use crate::report;
use crate::schema::tools::{ToolRequest, ToolResponse};
use crate::state::AppState;
use crate::tools::{execute_tool, ToolCall};

/// `POST /tools/{tool}`
pub async fn run_tool(
    State(state): State<AppState>,
    Path(tool): Path<String>,
    body: Bytes,
) -> Result<Json<ToolResponse>, ApiError> {
    let request: ToolRequest = optional_body(&body)?;
    let call = ToolCall {
        tool,
        params: request.params.unwrap_or_else(|| serde_json::json!({})),
        description: request.description,
        undo_data: request.undo_data,
    };
    let mut history = state.history.lock().await;

    let report = execute_tool(&mut history, state.bridge.as_ref(), call).await?;
    Ok(Json(ToolResponse {
        text: report::tool_text(&report),
        report,
    }))
}
