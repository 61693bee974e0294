//! Batch execution handler.

use axum::extract::State;
use axum::Json;

use crate::batch::{execute_batch, BatchItem, BatchOperation};
use crate::error::ApiError;
use crate::report;
use crate::schema::batch::{BatchRequest, BatchResponse};
use crate::state::AppState;

/// Runs independent commands in order; item failures never abort the batch.
///
/// The whole request is rejected before any dispatch when an item names an
/// unsupported operation or its params are not an object.
///
/// `POST /batch`
pub async fn run_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    if request.operations.is_empty() {
        return Err(ApiError::BadRequest(
            "operations must contain at least one item".to_string(),
        ));
    }

    let mut items = Vec::with_capacity(request.operations.len());
    for (i, op) in request.operations.into_iter().enumerate() {
        let operation: BatchOperation = op
            .operation
            .parse()
            .map_err(|msg| ApiError::BadRequest(format!("operations[{}]: {}", i, msg)))?;
        let params = op.params.unwrap_or_else(|| serde_json::json!({}));
        if !params.is_object() {
            return Err(ApiError::BadRequest(format!(
                "operations[{}]: params must be a JSON object",
                i
            )));
        }
        items.push(BatchItem {
            id: op.id.unwrap_or_else(|| format!("op_{}", i)),
            operation,
            params,
        });
    }

    let report = execute_batch(state.bridge.as_ref(), items).await;
    Ok(Json(BatchResponse {
        success: report.failure_count == 0,
        text: report::batch_text(&report),
        report,
    }))
}
