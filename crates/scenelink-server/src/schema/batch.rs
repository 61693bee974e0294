//! Batch execution request/response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::batch::BatchReport;

/// One requested item. `operation` and `params` are validated by the handler
/// so bad values are reported as 400s naming the offending item.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchOperationRequest {
    pub operation: String,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub operations: Vec<BatchOperationRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    /// No item failed.
    pub success: bool,
    pub text: String,
    #[serde(flatten)]
    pub report: BatchReport,
}
