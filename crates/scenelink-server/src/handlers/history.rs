//! History handlers for undo/redo, checkpoints, and listings.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::Json;

use crate::checkpoint;
use crate::error::ApiError;
use crate::handlers::optional_body;
use crate::report;
use crate::schema::history::{
    ChainResponse, CheckpointView, CreateCheckpointRequest, CreateCheckpointResponse,
    HistoryEntry, HistoryQuery, ListCheckpointsResponse, ListHistoryResponse,
    RestoreCheckpointResponse, StepRequest,
};
use crate::state::AppState;
use crate::undo;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const MAX_HISTORY_LIMIT: usize = 50;

fn step_count(body: &Bytes) -> Result<usize, ApiError> {
    let request: StepRequest = optional_body(body)?;
    let count = request.count.unwrap_or(1);
    if count == 0 {
        return Err(ApiError::BadRequest("count must be at least 1".to_string()));
    }
    Ok(count)
}

/// Undoes up to `count` operations, stopping at the first failure.
///
/// `POST /undo`
pub async fn undo(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChainResponse>, ApiError> {
    let count = step_count(&body)?;
    let mut history = state.history.lock().await;

    let report = undo::undo(&mut history, state.bridge.as_ref(), count).await;
    Ok(Json(ChainResponse {
        success: report.failed.is_empty(),
        text: report::chain_text(&report),
        report,
    }))
}

/// Redoes up to `count` operations, stopping at the first failure.
///
/// `POST /redo`
pub async fn redo(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChainResponse>, ApiError> {
    let count = step_count(&body)?;
    let mut history = state.history.lock().await;

    let report = undo::redo(&mut history, state.bridge.as_ref(), count).await;
    Ok(Json(ChainResponse {
        success: report.failed.is_empty(),
        text: report::chain_text(&report),
        report,
    }))
}

/// Creates a named checkpoint at the current position.
///
/// `POST /checkpoints`
pub async fn create_checkpoint(
    State(state): State<AppState>,
    Json(request): Json<CreateCheckpointRequest>,
) -> Result<Json<CreateCheckpointResponse>, ApiError> {
    let mut history = state.history.lock().await;

    let created = checkpoint::create(&mut history, &request.name, request.description.as_deref())?;
    Ok(Json(CreateCheckpointResponse {
        success: true,
        text: report::checkpoint_created_text(&created),
        checkpoint: created,
    }))
}

/// Lists all checkpoints in creation order.
///
/// `GET /checkpoints`
pub async fn list_checkpoints(
    State(state): State<AppState>,
) -> Result<Json<ListCheckpointsResponse>, ApiError> {
    let history = state.history.lock().await;

    let checkpoints: Vec<CheckpointView> = history
        .checkpoints()
        .map(|(name, index)| {
            let marker = usize::try_from(index)
                .ok()
                .and_then(|i| history.records().get(i));
            CheckpointView {
                name: name.to_string(),
                index,
                description: marker.map(|m| m.description.clone()),
                timestamp: marker.map(|m| m.timestamp.clone()),
            }
        })
        .collect();
    let status = history.status();
    Ok(Json(ListCheckpointsResponse {
        text: report::checkpoints_text(&checkpoints, &status),
        checkpoints,
        status,
    }))
}

/// Walks the cursor back or forward to a named checkpoint.
///
/// `POST /checkpoints/{name}/restore`
pub async fn restore_checkpoint(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RestoreCheckpointResponse>, ApiError> {
    let mut history = state.history.lock().await;

    let report = checkpoint::restore(&mut history, state.bridge.as_ref(), &name).await?;
    Ok(Json(RestoreCheckpointResponse {
        success: report.reached(),
        text: report::restore_text(&report),
        report,
    }))
}

/// Lists recent undoable operations, and redoable ones when asked.
///
/// `GET /history?limit=&showRedo=`
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ListHistoryResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_HISTORY_LIMIT
        )));
    }
    let history = state.history.lock().await;

    let operations: Vec<HistoryEntry> = history
        .undoable_window(limit)
        .into_iter()
        .map(|(index, record)| HistoryEntry::from_record(index, record))
        .collect();
    let redoable: Option<Vec<HistoryEntry>> = query.show_redo.unwrap_or(false).then(|| {
        history
            .redoable_window(limit)
            .into_iter()
            .map(|(index, record)| HistoryEntry::from_record(index, record))
            .collect()
    });
    let status = history.status();
    Ok(Json(ListHistoryResponse {
        text: report::history_text(&operations, redoable.as_deref(), &status),
        operations,
        redoable,
        status,
    }))
}
