/// Default base URL of the remote chat service.
pub const DEFAULT_CHAT_BASE_URL: &str = "http://localhost:8000";

const CHAT_PATH: &str = "/chat";

fn base_or_default(input: &str) -> &str {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        DEFAULT_CHAT_BASE_URL
    } else {
        trimmed
    }
}

/// Normalize a base URL to the chat endpoint.
///
/// Normalization rules:
/// 1) keep a URL already ending in `/chat` unchanged
/// 2) append `/chat` otherwise
pub fn normalize_chat_url(input: &str) -> String {
    let trimmed = base_or_default(input).trim_end_matches('/');
    if trimmed.ends_with(CHAT_PATH) {
        return trimmed.to_string();
    }
    format!("{trimmed}{CHAT_PATH}")
}

/// Normalize a base URL to the liveness probe endpoint (`GET /`).
///
/// A base URL pointing at `/chat` is probed at its parent.
pub fn normalize_probe_url(input: &str) -> String {
    let trimmed = base_or_default(input).trim_end_matches('/');
    let root = trimmed.strip_suffix(CHAT_PATH).unwrap_or(trimmed);
    format!("{root}/")
}
