//! Minimal contract between the chat front-end and an in-process responder.
//!
//! A responder turns one piece of user text into one piece of reply text. This
//! crate defines only the construction and invocation contract; it excludes
//! session handling, transcript storage, and any model/tool implementation.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Error returned while constructing a responder, before any turn runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponderInitError {
    message: String,
}

impl ResponderInitError {
    /// Creates a new responder initialization error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the underlying error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ResponderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ResponderInitError {}

impl From<String> for ResponderInitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ResponderInitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Error returned by a single `respond` call.
///
/// `message` is the short, user-facing text. `detail` optionally carries the
/// full diagnostic (tool output, upstream body, trace) for debug surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponderError {
    message: String,
    detail: Option<String>,
}

impl ResponderError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the diagnostic detail, falling back to the message.
    #[must_use]
    pub fn detail(&self) -> &str {
        self.detail.as_deref().unwrap_or(&self.message)
    }
}

impl fmt::Display for ResponderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ResponderError {}

impl From<String> for ResponderError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ResponderError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Immutable metadata describing a responder, shown in the status sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponderProfile {
    pub responder_id: String,
    pub description: Option<String>,
}

/// Responder interface for answering one user message.
pub trait Responder: Send + Sync + 'static {
    /// Returns responder identity metadata.
    fn profile(&self) -> ResponderProfile;

    /// Answers `text` synchronously.
    ///
    /// The call blocks the invoking thread for its whole duration. Any timeout
    /// is the responder's own concern.
    fn respond(&self, text: &str) -> Result<String, ResponderError>;
}

/// Construction half of the collaborator contract.
///
/// Construction is assumed to be expensive; callers are expected to cache the
/// returned handle rather than call `construct` per turn.
pub trait ResponderFactory: Send + Sync + 'static {
    fn construct(&self) -> Result<Arc<dyn Responder>, ResponderInitError>;
}

impl<F> ResponderFactory for F
where
    F: Fn() -> Result<Arc<dyn Responder>, ResponderInitError> + Send + Sync + 'static,
{
    fn construct(&self) -> Result<Arc<dyn Responder>, ResponderInitError> {
        self()
    }
}
