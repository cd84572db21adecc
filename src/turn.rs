//! One chat turn: record the prompt, invoke the backend, record the outcome.

use std::error::Error as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chat_api::{ChatApiClient, ChatApiError, ChatRequest};
use chat_responder::{ResponderError, ResponderInitError};
use session_store::{Message, Role, SessionStore, SessionStoreError, SessionToken};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{info, warn};

use crate::config::{FailurePolicy, Variant};
use crate::guard::ResponderGuard;

/// Shown by the client while a turn is in flight. Never stored.
pub const THINKING_PLACEHOLDER: &str = "Thinking...";

/// Shown instead of [`THINKING_PLACEHOLDER`] when the embedded responder is not
/// ready yet and the turn will have to construct it. Never stored.
pub const INLINE_INIT_PLACEHOLDER: &str = "Agent not initialized, attempting to initialize...";

#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Init(#[from] ResponderInitError),

    #[error(transparent)]
    Responder(#[from] ResponderError),

    #[error(transparent)]
    Remote(#[from] ChatApiError),

    #[error("responder panicked: {0}")]
    Panicked(String),

    #[error("responder task was cancelled")]
    Cancelled,
}

impl TurnError {
    /// Text displayed in place of the reply and, under `record`, stored.
    #[must_use]
    pub fn user_message(&self) -> String {
        format!("Error: {self}")
    }

    /// Full diagnostic: the responder's own detail, or the error and its
    /// source chain.
    #[must_use]
    pub fn debug_detail(&self) -> String {
        if let Self::Responder(error) = self {
            return error.detail().to_string();
        }

        let mut detail = format!("{self:?}");
        let mut source = self.source();
        while let Some(cause) = source {
            detail.push_str("\ncaused by: ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        detail
    }

    fn from_join(error: JoinError) -> Self {
        if error.is_panic() {
            let payload = error.into_panic();
            let message = payload
                .downcast_ref::<&str>()
                .map(|text| (*text).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            Self::Panicked(message)
        } else {
            Self::Cancelled
        }
    }
}

/// Where turns are answered.
#[derive(Clone)]
pub enum TurnBackend {
    Embedded(Arc<ResponderGuard>),
    Remote(ChatApiClient),
}

struct Reply {
    text: String,
    elapsed: Option<Duration>,
}

impl TurnBackend {
    #[must_use]
    pub fn variant(&self) -> Variant {
        match self {
            Self::Embedded(_) => Variant::Embedded,
            Self::Remote(_) => Variant::Remote,
        }
    }

    #[must_use]
    pub fn guard(&self) -> Option<&Arc<ResponderGuard>> {
        match self {
            Self::Embedded(guard) => Some(guard),
            Self::Remote(_) => None,
        }
    }

    async fn invoke(&self, token: &SessionToken, text: &str) -> Result<Reply, TurnError> {
        match self {
            Self::Embedded(guard) => {
                let guard = Arc::clone(guard);
                let text = text.to_owned();
                tokio::task::spawn_blocking(move || -> Result<Reply, TurnError> {
                    let responder = guard.ensure_ready()?;
                    let started = Instant::now();
                    let reply = responder.respond(&text)?;
                    Ok(Reply {
                        text: reply,
                        elapsed: Some(started.elapsed()),
                    })
                })
                .await
                .map_err(TurnError::from_join)?
            }
            Self::Remote(client) => {
                let request = ChatRequest::new(text, token.as_str());
                let response = client.send(&request).await?;
                Ok(Reply {
                    text: response.response,
                    elapsed: None,
                })
            }
        }
    }
}

/// Result of one turn as shown to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Reply text, or the `Error: ...` string of a failed turn.
    pub reply: String,
    pub failed: bool,
    /// Whether `reply` was appended to the transcript.
    pub recorded: bool,
    /// Responder time, embedded variant only.
    pub elapsed: Option<Duration>,
    /// Failure diagnostic, embedded variant only.
    pub debug_detail: Option<String>,
    /// The embedded responder was not ready when the turn started, so the
    /// turn itself attempted construction. Always `false` for remote.
    pub initialized_inline: bool,
}

impl TurnOutcome {
    #[must_use]
    pub fn elapsed_caption(&self) -> Option<String> {
        self.elapsed
            .map(|elapsed| format!("Response time: {:.2}s", elapsed.as_secs_f64()))
    }
}

pub struct TurnRunner {
    backend: TurnBackend,
    policy: FailurePolicy,
}

impl TurnRunner {
    pub fn new(backend: TurnBackend, policy: FailurePolicy) -> Self {
        Self { backend, policy }
    }

    pub fn backend(&self) -> &TurnBackend {
        &self.backend
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Runs one turn for `token`.
    ///
    /// Responder and transport failures become a failed [`TurnOutcome`]; only
    /// an unknown session is returned as an error.
    pub async fn run(
        &self,
        store: &SessionStore,
        token: &SessionToken,
        text: &str,
    ) -> Result<TurnOutcome, SessionStoreError> {
        store.append(token, Role::User, text)?;

        let variant = self.backend.variant();
        let initialized_inline = self
            .backend
            .guard()
            .is_some_and(|guard| guard.handle().is_none());
        info!(session = %token, %variant, chars = text.chars().count(), "turn started");
        if initialized_inline {
            info!(session = %token, "responder not initialized, constructing within turn");
        }
        let started = Instant::now();

        match self.backend.invoke(token, text).await {
            Ok(reply) => {
                store.push(token, Message::assistant(reply.text.as_str()))?;
                info!(
                    session = %token,
                    %variant,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "turn finished"
                );
                Ok(TurnOutcome {
                    reply: reply.text,
                    failed: false,
                    recorded: true,
                    elapsed: reply.elapsed,
                    debug_detail: None,
                    initialized_inline,
                })
            }
            Err(error) => {
                let message = error.user_message();
                warn!(
                    session = %token,
                    %variant,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %error,
                    "turn failed"
                );

                let recorded = match self.policy {
                    FailurePolicy::Record => {
                        store.push(token, Message::assistant_error(message.as_str()))?;
                        true
                    }
                    FailurePolicy::Transient => false,
                };
                let debug_detail = match variant {
                    Variant::Embedded => Some(error.debug_detail()),
                    Variant::Remote => None,
                };

                Ok(TurnOutcome {
                    reply: message,
                    failed: true,
                    recorded,
                    elapsed: None,
                    debug_detail,
                    initialized_inline,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefixes_error() {
        let error = TurnError::from(ResponderError::new("quota exceeded"));
        assert_eq!(error.user_message(), "Error: quota exceeded");
    }

    #[test]
    fn responder_detail_is_preferred_for_debugging() {
        let error = TurnError::from(
            ResponderError::new("tool failed").with_detail("Traceback: search() timed out"),
        );
        assert_eq!(error.debug_detail(), "Traceback: search() timed out");

        let init = TurnError::from(ResponderInitError::new("no key"));
        assert!(init.debug_detail().contains("no key"));
    }

    #[test]
    fn elapsed_caption_uses_two_decimals() {
        let outcome = TurnOutcome {
            reply: "hi".to_string(),
            failed: false,
            recorded: true,
            elapsed: Some(Duration::from_millis(1234)),
            debug_detail: None,
            initialized_inline: false,
        };
        assert_eq!(outcome.elapsed_caption().as_deref(), Some("Response time: 1.23s"));
    }
}
