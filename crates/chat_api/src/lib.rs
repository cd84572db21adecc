//! Transport-only client for the remote chat service.
//!
//! This crate owns request building, response parsing, and liveness probing
//! for the remote variant's two endpoints: `POST /chat` and `GET /`. It holds no
//! session or transcript state and performs no retries.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod url;

pub use client::{Availability, ChatApiClient};
pub use config::ChatApiConfig;
pub use error::ChatApiError;
pub use payload::{ChatRequest, ChatResponse};
pub use url::{normalize_chat_url, normalize_probe_url};
