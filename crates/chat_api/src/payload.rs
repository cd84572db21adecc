use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request body for `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: session_id.into(),
        }
    }
}

/// Success body of `POST /chat`.
///
/// Only `response` is required; any other fields the service sends are kept
/// in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
