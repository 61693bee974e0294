//! HTTP handler modules for the scenelink API.
//!
//! Each sub-module implements thin handlers that validate requests, acquire
//! the history lock, delegate to the engines, and render the `text` summary.
//! No business logic lives in handlers.

pub mod batch;
pub mod bridge;
pub mod history;
pub mod tools;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Parses an optional JSON body; an empty body yields the default request.
pub(crate) fn optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| ApiError::BadRequest(format!("invalid JSON body: {}", err)))
}
