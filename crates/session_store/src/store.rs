use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use time::OffsetDateTime;
use tracing::debug;

use crate::error::SessionStoreError;
use crate::schema::{Message, Role, SessionSummary, SessionToken};
use crate::transcript::Transcript;

/// Sessions untouched for this long are dropped.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug)]
struct Session {
    created_at: OffsetDateTime,
    last_seen: Instant,
    transcript: Transcript,
}

impl Session {
    fn new() -> Self {
        Self {
            created_at: OffsetDateTime::now_utc(),
            last_seen: Instant::now(),
            transcript: Transcript::new(),
        }
    }

    fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) >= ttl
    }
}

/// Maps session tokens to their transcripts.
///
/// A single lock guards the whole map. Two clients sharing one token may
/// interleave appends; each individual append is still atomic.
///
/// Sessions idle for longer than the store's TTL are swept whenever a new
/// session is created, so clients that never send their token back cannot
/// grow the map without bound.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionToken, Session>>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    #[must_use]
    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    /// Registers a new empty session.
    pub fn create(&self) -> SessionToken {
        let token = SessionToken::generate();
        let mut sessions = self.lock_sessions();
        self.sweep_idle(&mut sessions);
        sessions.insert(token.clone(), Session::new());
        debug!(session = %token, "session created");
        token
    }

    /// Returns the session named by `token`, creating a fresh one when the
    /// token is missing, was never issued by this process, or has gone idle.
    ///
    /// The boolean is `true` when a new session was created.
    pub fn resolve(&self, token: Option<&str>) -> (SessionToken, bool) {
        if let Some(raw) = token.map(str::trim).filter(|raw| !raw.is_empty()) {
            let now = Instant::now();
            let mut sessions = self.lock_sessions();
            if let Some((known, session)) = sessions.get_key_value(raw) {
                if !session.is_idle(now, self.idle_ttl) {
                    let known = known.clone();
                    if let Some(session) = sessions.get_mut(&known) {
                        session.touch();
                    }
                    return (known, false);
                }
            }
        }

        (self.create(), true)
    }

    /// Drops every session idle for at least the TTL. Returns how many went.
    pub fn sweep(&self) -> usize {
        let mut sessions = self.lock_sessions();
        self.sweep_idle(&mut sessions)
    }

    #[must_use]
    pub fn contains(&self, token: &SessionToken) -> bool {
        self.lock_sessions().contains_key(token)
    }

    pub fn append(
        &self,
        token: &SessionToken,
        role: Role,
        content: impl Into<String>,
    ) -> Result<(), SessionStoreError> {
        self.push(token, Message::new(role, content))
    }

    pub fn push(&self, token: &SessionToken, message: Message) -> Result<(), SessionStoreError> {
        let mut sessions = self.lock_sessions();
        let session = sessions
            .get_mut(token)
            .ok_or_else(|| SessionStoreError::unknown(token.as_str()))?;
        session.touch();
        session.transcript.push(message);
        Ok(())
    }

    /// Returns a snapshot of the session's transcript.
    pub fn render(&self, token: &SessionToken) -> Result<Transcript, SessionStoreError> {
        self.lock_sessions()
            .get(token)
            .map(|session| session.transcript.clone())
            .ok_or_else(|| SessionStoreError::unknown(token.as_str()))
    }

    /// Drops the session and its transcript, returning a new empty session's
    /// token. The old token is unknown afterwards.
    pub fn reset(&self, token: &SessionToken) -> Result<SessionToken, SessionStoreError> {
        let mut sessions = self.lock_sessions();
        if sessions.remove(token).is_none() {
            return Err(SessionStoreError::unknown(token.as_str()));
        }

        let mut next = SessionToken::generate();
        while sessions.contains_key(&next) {
            next = SessionToken::generate();
        }
        sessions.insert(next.clone(), Session::new());
        debug!(previous = %token, session = %next, "session reset");
        Ok(next)
    }

    pub fn summary(&self, token: &SessionToken) -> Result<SessionSummary, SessionStoreError> {
        self.lock_sessions()
            .get(token)
            .map(|session| SessionSummary {
                session_id: token.clone(),
                created_at: session.created_at,
                message_count: session.transcript.len(),
            })
            .ok_or_else(|| SessionStoreError::unknown(token.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_sessions().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_sessions().is_empty()
    }

    fn sweep_idle(&self, sessions: &mut HashMap<SessionToken, Session>) -> usize {
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_idle(now, self.idle_ttl));
        let dropped = before - sessions.len();
        if dropped > 0 {
            debug!(dropped, remaining = sessions.len(), "idle sessions dropped");
        }
        dropped
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<SessionToken, Session>> {
        match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
