//! API schema types for request/response definitions.
//!
//! Each sub-module defines the request and response types for a specific
//! API domain. Every success response carries a human-readable `text` next to
//! the structured fields it was rendered from.

pub mod batch;
pub mod bridge;
pub mod history;
pub mod tools;
