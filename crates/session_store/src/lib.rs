//! In-memory, per-session conversation state.
//!
//! Each session is keyed by an opaque token carried by the client and owns one
//! append-only transcript. Nothing here survives a process restart.

mod error;
mod schema;
mod store;
mod transcript;

pub use error::SessionStoreError;
pub use schema::{Message, Role, SessionSummary, SessionToken};
pub use store::{SessionStore, DEFAULT_IDLE_TTL};
pub use transcript::Transcript;
