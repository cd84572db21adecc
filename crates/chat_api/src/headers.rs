use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::ChatApiConfig;
use crate::error::ChatApiError;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Build a deterministic header map for chat requests.
///
/// Extra headers are applied last and may override the defaults.
pub fn build_headers(config: &ChatApiConfig) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();

    headers.insert(HEADER_ACCEPT.to_owned(), "application/json".to_owned());
    headers.insert(
        HEADER_CONTENT_TYPE.to_owned(),
        "application/json".to_owned(),
    );

    let ua = match config.user_agent.as_deref() {
        Some(explicit) if !explicit.trim().is_empty() => explicit.trim().to_owned(),
        _ => default_user_agent(),
    };
    headers.insert(HEADER_USER_AGENT.to_owned(), ua);

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    headers
}

/// Convert [`build_headers`] output into a `reqwest` header map.
pub fn to_header_map(headers: BTreeMap<String, String>) -> Result<HeaderMap, ChatApiError> {
    let mut out = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| ChatApiError::InvalidHeader(format!("invalid header key: {key}")))?;
        let value = HeaderValue::from_str(&value)
            .map_err(|_| ChatApiError::InvalidHeader(format!("invalid header value for {key}")))?;
        out.insert(name, value);
    }
    Ok(out)
}

pub fn default_user_agent() -> String {
    format!("agent-chat/{}", env!("CARGO_PKG_VERSION"))
}
