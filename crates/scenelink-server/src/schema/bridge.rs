//! Connection test response.

use serde::Serialize;

use scenelink_bridge::ConnectionReport;

#[derive(Debug, Clone, Serialize)]
pub struct BridgeStatusResponse {
    pub text: String,
    #[serde(flatten)]
    pub report: ConnectionReport,
}
