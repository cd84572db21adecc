//! HTTP surface: the chat page and its JSON API.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use session_store::{Message, Role, SessionStore, SessionSummary, SessionToken};
use tracing::{info, warn};

use crate::config::{FailurePolicy, Variant};
use crate::page::INDEX_HTML;
use crate::status::{current_status, ServiceStatus};
use crate::turn::{TurnOutcome, TurnRunner};

pub const SESSION_COOKIE: &str = "agent_chat_session";
pub const SESSION_HEADER: &str = "x-session-id";

/// Shared handler state: one session store and one turn runner per process.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppInner>,
}

struct AppInner {
    sessions: SessionStore,
    runner: TurnRunner,
}

impl AppState {
    pub fn new(runner: TurnRunner) -> Self {
        Self::with_sessions(runner, SessionStore::new())
    }

    pub fn with_sessions(runner: TurnRunner, sessions: SessionStore) -> Self {
        Self {
            inner: Arc::new(AppInner { sessions, runner }),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    pub fn runner(&self) -> &TurnRunner {
        &self.inner.runner
    }

    pub fn variant(&self) -> Variant {
        self.inner.runner.backend().variant()
    }

    /// Reset is a remote-variant control.
    pub fn reset_enabled(&self) -> bool {
        self.variant() == Variant::Remote
    }
}

pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(index))
        .route("/api/session", get(session_view))
        .route("/api/turn", post(submit_turn))
        .route("/api/status", get(status_view));
    if state.reset_enabled() {
        router = router.route("/api/reset", post(reset_session));
    }
    router.with_state(state)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub role: Role,
    pub content: String,
    pub error: bool,
    pub html: String,
}

impl From<&Message> for RenderedMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
            error: message.error,
            html: markdown::to_html(&message.content),
        }
    }
}

#[derive(Debug, Serialize)]
struct SessionView {
    session: SessionSummary,
    variant: Variant,
    failure_policy: FailurePolicy,
    reset_enabled: bool,
    messages: Vec<RenderedMessage>,
    status: ServiceStatus,
    init_error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TurnInput {
    text: String,
}

#[derive(Debug, Serialize)]
struct TurnView {
    session_id: SessionToken,
    reply: RenderedMessage,
    failed: bool,
    recorded: bool,
    elapsed_secs: Option<f64>,
    elapsed_caption: Option<String>,
    debug_detail: Option<String>,
    initialized_inline: bool,
}

impl TurnView {
    fn new(session_id: SessionToken, outcome: TurnOutcome) -> Self {
        let message = if outcome.failed {
            Message::assistant_error(outcome.reply.as_str())
        } else {
            Message::assistant(outcome.reply.as_str())
        };
        Self {
            session_id,
            reply: RenderedMessage::from(&message),
            failed: outcome.failed,
            recorded: outcome.recorded,
            elapsed_secs: outcome.elapsed.map(|elapsed| elapsed.as_secs_f64()),
            elapsed_caption: outcome.elapsed_caption(),
            debug_detail: outcome.debug_detail,
            initialized_inline: outcome.initialized_inline,
        }
    }
}

#[derive(Debug, Serialize)]
struct ResetView {
    session_id: SessionToken,
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn session_view(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, created) = state.sessions().resolve(client_token(&headers).as_deref());
    if created {
        info!(session = %token, "session started");
    }

    let init_error = match state.runner().backend().guard() {
        Some(guard) if guard.handle().is_none() => {
            let guard = Arc::clone(guard);
            match tokio::task::spawn_blocking(move || guard.ensure_ready().map(|_| ())).await {
                Ok(Ok(())) => None,
                Ok(Err(error)) => Some(error.message().to_string()),
                Err(error) => Some(format!("responder initialization task failed: {error}")),
            }
        }
        _ => None,
    };

    let (summary, transcript) = match (
        state.sessions().summary(&token),
        state.sessions().render(&token),
    ) {
        (Ok(summary), Ok(transcript)) => (summary, transcript),
        (Err(error), _) | (_, Err(error)) => {
            return ApiError::new(StatusCode::CONFLICT, error.to_string()).into_response()
        }
    };

    let view = SessionView {
        session: summary,
        variant: state.variant(),
        failure_policy: state.runner().policy(),
        reset_enabled: state.reset_enabled(),
        messages: transcript.messages().iter().map(RenderedMessage::from).collect(),
        status: current_status(state.runner().backend()).await,
        init_error,
    };
    with_session_cookie(&token, Json(view))
}

async fn submit_turn(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<TurnInput>,
) -> Response {
    if input.text.trim().is_empty() {
        return ApiError::new(StatusCode::BAD_REQUEST, "message text must not be empty")
            .into_response();
    }

    let (token, created) = state.sessions().resolve(client_token(&headers).as_deref());
    if created {
        info!(session = %token, "session started by turn");
    }

    match state
        .runner()
        .run(state.sessions(), &token, &input.text)
        .await
    {
        Ok(outcome) => with_session_cookie(&token, Json(TurnView::new(token.clone(), outcome))),
        Err(error) => {
            warn!(session = %token, error = %error, "session vanished during turn");
            ApiError::new(StatusCode::CONFLICT, error.to_string()).into_response()
        }
    }
}

async fn reset_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, _) = state.sessions().resolve(client_token(&headers).as_deref());
    match state.sessions().reset(&token) {
        Ok(next) => {
            info!(previous = %token, session = %next, "session reset");
            with_session_cookie(&next, Json(ResetView { session_id: next.clone() }))
        }
        Err(error) => ApiError::new(StatusCode::CONFLICT, error.to_string()).into_response(),
    }
}

async fn status_view(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(current_status(state.runner().backend()).await)
}

/// The session token carried by the client: the explicit header wins over
/// the cookie.
pub fn client_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return Some(value.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[must_use]
pub fn session_cookie(token: &SessionToken) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

fn with_session_cookie(token: &SessionToken, body: impl IntoResponse) -> Response {
    match HeaderValue::from_str(&session_cookie(token)) {
        Ok(cookie) => ([(header::SET_COOKIE, cookie)], body).into_response(),
        Err(_) => body.into_response(),
    }
}
