//! Deterministic mock implementation of the shared `chat_responder` contract.
//!
//! This crate contains no model/tool logic and is intended for local
//! development and contract-level integration testing of the embedded variant.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chat_responder::{
    Responder, ResponderError, ResponderFactory, ResponderInitError, ResponderProfile,
};

/// Stable responder identifier used for explicit startup selection.
pub const MOCK_RESPONDER_ID: &str = "mock";

const DEFAULT_REPLIES: [&str; 8] = [
    "That's interesting! Tell me more.",
    "I see what you mean.",
    "Fascinating perspective!",
    "Could you elaborate on that?",
    "That makes sense to me.",
    "I hadn't thought of it that way.",
    "Great point!",
    "Thanks for sharing that.",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Behavior {
    Replies(Vec<String>),
    Fail(String),
}

/// Deterministic responder cycling through canned replies.
#[derive(Debug)]
pub struct MockResponder {
    behavior: Behavior,
    cursor: Mutex<usize>,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockResponder {
    /// Creates a responder answering with `replies` in order, wrapping around.
    #[must_use]
    pub fn new(replies: Vec<String>) -> Self {
        Self::with_behavior(Behavior::Replies(sanitize_replies(replies)))
    }

    /// Creates a responder whose every call fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    /// Sleeps for `delay` inside every call to mimic a slow model.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of `respond` calls observed so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            cursor: Mutex::new(0),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Default for MockResponder {
    fn default() -> Self {
        Self::new(DEFAULT_REPLIES.iter().map(|reply| reply.to_string()).collect())
    }
}

impl Responder for MockResponder {
    fn profile(&self) -> ResponderProfile {
        ResponderProfile {
            responder_id: MOCK_RESPONDER_ID.to_string(),
            description: Some("Deterministic canned replies".to_string()),
        }
    }

    fn respond(&self, text: &str) -> Result<String, ResponderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        match &self.behavior {
            Behavior::Fail(message) => {
                let detail = format!(
                    "mock responder failed while answering {} chars: {message}",
                    text.chars().count()
                );
                Err(ResponderError::new(message.clone()).with_detail(detail))
            }
            Behavior::Replies(replies) => {
                let mut cursor = lock_unpoisoned(&self.cursor);
                let reply = replies[*cursor % replies.len()].clone();
                *cursor = (*cursor + 1) % replies.len();
                Ok(reply)
            }
        }
    }
}

/// Factory producing [`MockResponder`] handles.
///
/// It can be told to fail the first `n` constructions, which exercises the
/// retry-on-next-turn path of the embedded variant.
pub struct MockResponderFactory {
    remaining_failures: AtomicUsize,
    constructions: AtomicUsize,
    build: Box<dyn Fn() -> MockResponder + Send + Sync>,
}

impl MockResponderFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::with_builder(MockResponder::default)
    }

    /// Uses `build` to create the responder on each successful construction.
    #[must_use]
    pub fn with_builder(build: impl Fn() -> MockResponder + Send + Sync + 'static) -> Self {
        Self {
            remaining_failures: AtomicUsize::new(0),
            constructions: AtomicUsize::new(0),
            build: Box::new(build),
        }
    }

    /// Fails the next `count` constructions before succeeding.
    #[must_use]
    pub fn failing_first(self, count: usize) -> Self {
        self.remaining_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Number of construction calls observed so far, failed ones included.
    #[must_use]
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }
}

impl Default for MockResponderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponderFactory for MockResponderFactory {
    fn construct(&self) -> Result<Arc<dyn Responder>, ResponderInitError> {
        let attempt = self.constructions.fetch_add(1, Ordering::SeqCst) + 1;

        let should_fail = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok();
        if should_fail {
            return Err(ResponderInitError::new(format!(
                "mock construction attempt {attempt} failed"
            )));
        }

        Ok(Arc::new((self.build)()))
    }
}

fn sanitize_replies(replies: Vec<String>) -> Vec<String> {
    let mut sanitized: Vec<String> = replies
        .into_iter()
        .filter(|reply| !reply.trim().is_empty())
        .collect();

    if sanitized.is_empty() {
        sanitized.push(DEFAULT_REPLIES[0].to_string());
    }

    sanitized
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_exposes_explicit_mock_identity() {
        let profile = MockResponder::default().profile();
        assert_eq!(profile.responder_id, MOCK_RESPONDER_ID);
    }

    #[test]
    fn replies_cycle_in_order_and_wrap() {
        let responder = MockResponder::new(vec!["one".to_string(), "two".to_string()]);

        let replies: Vec<String> = (0..5)
            .map(|_| responder.respond("hi").expect("mock reply"))
            .collect();

        assert_eq!(replies, vec!["one", "two", "one", "two", "one"]);
        assert_eq!(responder.calls(), 5);
    }

    #[test]
    fn blank_replies_fall_back_to_a_default() {
        let responder = MockResponder::new(vec!["  ".to_string()]);
        assert_eq!(
            responder.respond("hi").expect("fallback reply"),
            DEFAULT_REPLIES[0]
        );
    }

    #[test]
    fn failing_responder_reports_message_and_detail() {
        let responder = MockResponder::failing("tool call failed");
        let error = responder.respond("hello").expect_err("failing mock must fail");

        assert_eq!(error.message(), "tool call failed");
        assert!(error.detail().contains("5 chars"));
    }

    #[test]
    fn factory_fails_requested_number_of_times_then_succeeds() {
        let factory = MockResponderFactory::new().failing_first(2);

        assert!(factory.construct().is_err());
        assert!(factory.construct().is_err());
        assert!(factory.construct().is_ok());
        assert!(factory.construct().is_ok());
        assert_eq!(factory.constructions(), 4);
    }

    #[test]
    fn factory_uses_custom_builder() {
        let factory =
            MockResponderFactory::with_builder(|| MockResponder::new(vec!["hi there".to_string()]));
        let responder = factory.construct().expect("construction succeeds");
        assert_eq!(responder.respond("hello").expect("reply"), "hi there");
    }
}
