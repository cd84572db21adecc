//! Browser chat front-end for a conversational agent.
//!
//! ## Variants
//!
//! `agent_chat` runs in one of two modes, chosen with `AGENT_CHAT_VARIANT`:
//!
//! - `embedded` (default): the responder lives in this process. It is built
//!   lazily on first use and cached for every session.
//! - `remote`: each turn is forwarded as `POST {base}/chat` with
//!   `{"message": ..., "session_id": ...}` to `AGENT_CHAT_API_BASE_URL`
//!   (default `http://localhost:8000`). `GET {base}/` is used as a liveness
//!   probe.
//!
//! ## Environment
//!
//! - `AGENT_CHAT_RESPONDER=mock` selects the embedded responder.
//! - `AGENT_CHAT_BIND` sets the listen address (default `127.0.0.1:8501`).
//! - `AGENT_CHAT_FAILURE_POLICY=record|transient` decides whether a failed
//!   turn's `Error: ...` text is stored in the transcript.
//! - `AGENT_CHAT_PROBE_TIMEOUT_MS` bounds the liveness probe (default 5000).
//! - `AGENT_CHAT_MOCK_INIT_FAILURES` makes the mock factory fail its first
//!   constructions.
//! - `RUST_LOG` filters logs (default `info`).
//!
//! Transcripts are kept in memory per browser session, keyed by the
//! `agent_chat_session` cookie or the `x-session-id` header. Nothing survives a
//! restart.

pub mod app;
pub mod config;
pub mod guard;
pub mod logging;
pub mod page;
pub mod responders;
pub mod server;
pub mod status;
pub mod turn;

pub use app::{backend_from_config, state_from_config, StartupError};
pub use config::{ChatConfig, ConfigError, FailurePolicy, Variant};
pub use guard::{GuardStatus, ResponderGuard};
pub use server::{router, AppState, RenderedMessage};
pub use status::{current_status, ServiceStatus};
pub use turn::{TurnBackend, TurnError, TurnOutcome, TurnRunner};
