use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use session_store::{
    Message, Role, SessionStore, SessionStoreError, SessionToken, DEFAULT_IDLE_TTL,
};

fn rendered(store: &SessionStore, token: &SessionToken) -> Vec<(Role, String)> {
    store
        .render(token)
        .expect("session should exist")
        .render()
        .map(|(role, content)| (role, content.to_string()))
        .collect()
}

#[test]
fn create_starts_with_an_empty_transcript() {
    let store = SessionStore::new();
    let token = store.create();

    assert!(store.render(&token).expect("new session").is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn successful_turns_alternate_in_submission_order() {
    let store = SessionStore::new();
    let token = store.create();

    for n in 0..5 {
        store
            .append(&token, Role::User, format!("question {n}"))
            .expect("user append");
        store
            .append(&token, Role::Assistant, format!("answer {n}"))
            .expect("assistant append");
    }

    let messages = rendered(&store, &token);
    assert_eq!(messages.len(), 10);
    for (index, (role, content)) in messages.iter().enumerate() {
        let n = index / 2;
        if index % 2 == 0 {
            assert_eq!((*role, content.as_str()), (Role::User, format!("question {n}").as_str()));
        } else {
            assert_eq!(
                (*role, content.as_str()),
                (Role::Assistant, format!("answer {n}").as_str())
            );
        }
    }
}

#[test]
fn render_is_idempotent_without_appends() {
    let store = SessionStore::new();
    let token = store.create();
    store.append(&token, Role::User, "hello").expect("append");

    let first = rendered(&store, &token);
    let second = rendered(&store, &token);
    assert_eq!(first, second);
}

#[test]
fn reset_clears_transcript_and_issues_distinct_token() {
    let store = SessionStore::new();
    let token = store.create();
    store.append(&token, Role::User, "hello").expect("append");

    let next = store.reset(&token).expect("reset known session");

    assert_ne!(next, token);
    assert!(store.render(&next).expect("new session").is_empty());
    assert_eq!(
        store.render(&token).expect_err("old token is gone"),
        SessionStoreError::unknown(token.as_str())
    );
    assert_eq!(store.len(), 1);
}

#[test]
fn reset_of_unknown_session_fails() {
    let store = SessionStore::new();
    let stranger = store.create();
    let store_b = SessionStore::new();

    assert!(matches!(
        store_b.reset(&stranger),
        Err(SessionStoreError::UnknownSession { .. })
    ));
}

#[test]
fn resolve_reuses_known_tokens_and_replaces_unknown_ones() {
    let store = SessionStore::new();
    let token = store.create();

    let (same, created) = store.resolve(Some(token.as_str()));
    assert_eq!(same, token);
    assert!(!created);

    let (fresh, created) = store.resolve(Some("not-issued-by-this-process"));
    assert!(created);
    assert_ne!(fresh.as_str(), "not-issued-by-this-process");

    let (blank, created) = store.resolve(Some("   "));
    assert!(created);
    assert_ne!(blank, fresh);

    let (missing, created) = store.resolve(None);
    assert!(created);
    assert_eq!(store.len(), 4);
    assert!(store.contains(&missing));
}

#[test]
fn sessions_are_isolated() {
    let store = SessionStore::new();
    let alice = store.create();
    let bob = store.create();

    store.append(&alice, Role::User, "alice says hi").expect("append");

    assert_eq!(store.render(&alice).expect("alice").len(), 1);
    assert!(store.render(&bob).expect("bob").is_empty());
}

#[test]
fn error_messages_are_stored_with_flag() {
    let store = SessionStore::new();
    let token = store.create();
    store.push(&token, Message::user("hello")).expect("push");
    store
        .push(&token, Message::assistant_error("Error: upstream failed"))
        .expect("push");

    let transcript = store.render(&token).expect("transcript");
    assert_eq!(
        transcript.messages(),
        &[
            Message::user("hello"),
            Message::assistant_error("Error: upstream failed"),
        ]
    );
    assert_eq!(transcript.conversation().count(), 1);
}

#[test]
fn summary_serializes_rfc3339_creation_time() {
    let store = SessionStore::new();
    let token = store.create();
    store.append(&token, Role::User, "hello").expect("append");

    let summary = store.summary(&token).expect("summary");
    assert_eq!(summary.message_count, 1);

    let value = serde_json::to_value(&summary).expect("serialize summary");
    assert_eq!(value["session_id"], token.as_str());
    let created_at = value["created_at"].as_str().expect("created_at is a string");
    assert!(created_at.contains('T'));
    assert!(created_at.ends_with('Z'));
}

#[test]
fn message_wire_shape_uses_lowercase_roles() {
    let value = serde_json::to_value(Message::assistant("hi there")).expect("serialize");
    assert_eq!(value["role"], "assistant");
    assert_eq!(value["content"], "hi there");
    assert_eq!(value["error"], false);
}

#[test]
fn concurrent_appends_from_shared_token_are_all_kept() {
    let store = Arc::new(SessionStore::new());
    let token = store.create();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            let token = token.clone();
            thread::spawn(move || {
                for n in 0..25 {
                    store
                        .append(&token, Role::User, format!("{worker}-{n}"))
                        .expect("append from worker");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker thread");
    }

    let transcript = store.render(&token).expect("transcript");
    assert_eq!(transcript.len(), 200);
    let unique: HashSet<&str> = transcript
        .messages()
        .iter()
        .map(|message| message.content.as_str())
        .collect();
    assert_eq!(unique.len(), 200);
}

#[test]
fn idle_sessions_are_dropped_when_new_ones_arrive() {
    let store = SessionStore::with_idle_ttl(Duration::from_millis(50));
    let stale: Vec<SessionToken> = (0..10).map(|_| store.create()).collect();
    assert_eq!(store.len(), 10);

    thread::sleep(Duration::from_millis(80));
    let fresh = store.create();

    assert_eq!(store.len(), 1);
    assert!(store.contains(&fresh));
    assert!(stale.iter().all(|token| !store.contains(token)));
    assert!(matches!(
        store.render(&stale[0]),
        Err(SessionStoreError::UnknownSession { .. })
    ));
}

#[test]
fn idle_token_is_replaced_on_resolve() {
    let store = SessionStore::with_idle_ttl(Duration::from_millis(50));
    let token = store.create();
    store.append(&token, Role::User, "old").expect("append");

    thread::sleep(Duration::from_millis(80));
    let (replacement, created) = store.resolve(Some(token.as_str()));

    assert!(created);
    assert_ne!(replacement, token);
    assert!(!store.contains(&token));
    assert!(store.render(&replacement).expect("fresh").is_empty());
}

#[test]
fn activity_keeps_a_session_alive() {
    let store = SessionStore::with_idle_ttl(Duration::from_millis(200));
    let token = store.create();

    for _ in 0..4 {
        thread::sleep(Duration::from_millis(80));
        let (same, created) = store.resolve(Some(token.as_str()));
        assert_eq!(same, token);
        assert!(!created);
    }

    assert_eq!(store.sweep(), 0);
    assert!(store.contains(&token));
}

#[test]
fn default_store_uses_a_day_long_ttl() {
    assert_eq!(SessionStore::new().idle_ttl(), DEFAULT_IDLE_TTL);
    assert_eq!(DEFAULT_IDLE_TTL, Duration::from_secs(86_400));
}
