use chat_api::url::DEFAULT_CHAT_BASE_URL;
use chat_api::{normalize_chat_url, normalize_probe_url};

#[test]
fn chat_url_appends_chat_path() {
    assert_eq!(
        normalize_chat_url("http://localhost:8000"),
        "http://localhost:8000/chat"
    );
    assert_eq!(
        normalize_chat_url("https://bot.example.com/api/"),
        "https://bot.example.com/api/chat"
    );
}

#[test]
fn chat_url_keeps_existing_chat_suffix() {
    assert_eq!(
        normalize_chat_url("http://localhost:8000/chat/"),
        "http://localhost:8000/chat"
    );
}

#[test]
fn blank_base_falls_back_to_default() {
    assert_eq!(
        normalize_chat_url("   "),
        format!("{DEFAULT_CHAT_BASE_URL}/chat")
    );
    assert_eq!(normalize_probe_url(""), format!("{DEFAULT_CHAT_BASE_URL}/"));
}

#[test]
fn probe_url_targets_service_root() {
    assert_eq!(
        normalize_probe_url("http://localhost:8000"),
        "http://localhost:8000/"
    );
    assert_eq!(
        normalize_probe_url("http://localhost:8000/chat"),
        "http://localhost:8000/"
    );
}
