//! Connection test handler.

use axum::extract::State;
use axum::Json;

use crate::report;
use crate::schema::bridge::BridgeStatusResponse;
use crate::state::AppState;

/// Probes the host immediately and reports the connection state.
///
/// `GET /bridge/status`
pub async fn bridge_status(State(state): State<AppState>) -> Json<BridgeStatusResponse> {
    let report = state.bridge.test_connection().await;
    Json(BridgeStatusResponse {
        text: report::connection_text(&report),
        report,
    })
}
