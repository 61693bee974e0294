//! Wire types for the host listener protocol.
//!
//! Commands are `POST /` with `{type, params}`; the reply is
//! `{success, result?, error?}`. The listener often answers with flat objects
//! (`{"success": true, "actorName": "Wall_01", ...}`), so everything except
//! `success` and `error` becomes the result when no explicit `result` key is
//! present. `GET /` answers with a [`HostStatus`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BridgeError;

/// Request body for one host command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandRequest<'a> {
    #[serde(rename = "type")]
    pub command_type: &'a str,
    pub params: &'a Value,
}

/// Normalized reply to one host command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandOutcome {
    pub fn ok(result: Value) -> Self {
        CommandOutcome {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        CommandOutcome {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Error text for a failed outcome, with a placeholder when the host gave none.
    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "command failed without an error message".to_string())
    }

    /// Normalizes a decoded response body.
    pub fn from_body(body: Value) -> Result<Self, BridgeError> {
        let mut map = match body {
            Value::Object(map) => map,
            other => {
                return Err(BridgeError::Protocol(format!(
                    "expected a JSON object, got {}",
                    other
                )))
            }
        };

        let success = map
            .remove("success")
            .and_then(|v| v.as_bool())
            .ok_or_else(|| BridgeError::Protocol("missing boolean 'success' field".to_string()))?;

        let error = match map.remove("error") {
            None | Some(Value::Null) => None,
            Some(Value::String(message)) => Some(message),
            Some(other) => Some(other.to_string()),
        };

        let result = match map.remove("result") {
            Some(result) => Some(result),
            None if map.is_empty() => None,
            None => Some(Value::Object(map)),
        };

        Ok(CommandOutcome {
            success,
            result,
            error,
        })
    }

    /// Field of the result object, if any.
    pub fn result_field(&self, key: &str) -> Option<&Value> {
        self.result.as_ref().and_then(|r| r.get(key))
    }
}

/// Liveness payload returned by `GET /` on the listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HostStatus {
    pub fn is_online(&self) -> bool {
        self.status == "online"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn explicit_result_is_kept() {
        let outcome =
            CommandOutcome::from_body(json!({ "success": true, "result": { "id": 1 } })).unwrap();
        assert_eq!(outcome, CommandOutcome::ok(json!({ "id": 1 })));
    }

    #[test]
    fn flat_body_becomes_result() {
        let outcome = CommandOutcome::from_body(json!({
            "success": true,
            "actorName": "Wall_01",
            "location": [0.0, 0.0, 0.0]
        }))
        .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.result_field("actorName"), Some(&json!("Wall_01")));
        assert!(outcome.error.is_none());
    }

    #[test]
    fn failure_keeps_error_text() {
        let outcome =
            CommandOutcome::from_body(json!({ "success": false, "error": "Asset not found" }))
                .unwrap();
        assert!(!outcome.success);
        assert!(outcome.result.is_none());
        assert_eq!(outcome.error_message(), "Asset not found");
    }

    #[test]
    fn rejects_bodies_without_success_flag() {
        assert!(matches!(
            CommandOutcome::from_body(json!({ "ok": true })),
            Err(BridgeError::Protocol(_))
        ));
        assert!(matches!(
            CommandOutcome::from_body(json!([1, 2])),
            Err(BridgeError::Protocol(_))
        ));
    }

    #[test]
    fn host_status_tolerates_extra_fields() {
        let status: HostStatus = serde_json::from_value(json!({
            "status": "online",
            "version": "2.0",
            "ready": true,
            "available_commands": ["actor.spawn"]
        }))
        .unwrap();
        assert!(status.is_online());
        assert_eq!(status.version.as_deref(), Some("2.0"));
        assert_eq!(status.extra.get("ready"), Some(&json!(true)));
    }
}
