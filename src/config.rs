//! Environment configuration.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use chat_api::url::DEFAULT_CHAT_BASE_URL;
use chat_api::ChatApiConfig;
use chat_responder_mock::MOCK_RESPONDER_ID;
use serde::Serialize;
use session_store::DEFAULT_IDLE_TTL;
use thiserror::Error;

pub const VARIANT_ENV_VAR: &str = "AGENT_CHAT_VARIANT";
pub const RESPONDER_ENV_VAR: &str = "AGENT_CHAT_RESPONDER";
pub const API_BASE_URL_ENV_VAR: &str = "AGENT_CHAT_API_BASE_URL";
pub const BIND_ENV_VAR: &str = "AGENT_CHAT_BIND";
pub const FAILURE_POLICY_ENV_VAR: &str = "AGENT_CHAT_FAILURE_POLICY";
pub const PROBE_TIMEOUT_ENV_VAR: &str = "AGENT_CHAT_PROBE_TIMEOUT_MS";
pub const MOCK_INIT_FAILURES_ENV_VAR: &str = "AGENT_CHAT_MOCK_INIT_FAILURES";
pub const SESSION_IDLE_ENV_VAR: &str = "AGENT_CHAT_SESSION_IDLE_SECS";

pub const DEFAULT_BIND: &str = "127.0.0.1:8501";
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid; expected {expected}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("unsupported responder '{0}'. Available responders: mock")]
    UnknownResponder(String),
}

/// Which deployable front-end this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Holds a long-lived in-process responder.
    Embedded,
    /// Forwards each turn to a remote chat service.
    Remote,
}

impl Variant {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Embedded => "embedded",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "embedded" => Ok(Self::Embedded),
            "remote" => Ok(Self::Remote),
            _ => Err(()),
        }
    }
}

/// What happens to the error text of a failed turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Store the error text as an assistant message.
    Record,
    /// Show the error text but keep it out of the transcript.
    Transient,
}

impl FromStr for FailurePolicy {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "record" => Ok(Self::Record),
            "transient" => Ok(Self::Transient),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub variant: Variant,
    pub responder_id: String,
    pub api_base_url: String,
    pub bind: SocketAddr,
    pub failure_policy: FailurePolicy,
    pub probe_timeout: Duration,
    pub mock_init_failures: usize,
    /// Sessions untouched for this long are forgotten.
    pub session_idle_ttl: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Embedded,
            responder_id: MOCK_RESPONDER_ID.to_string(),
            api_base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            bind: SocketAddr::from(([127, 0, 0, 1], 8501)),
            failure_policy: FailurePolicy::Record,
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            mock_init_failures: 0,
            session_idle_ttl: DEFAULT_IDLE_TTL,
        }
    }
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key).and_then(|value| {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };
        let defaults = Self::default();

        let variant = match get(VARIANT_ENV_VAR) {
            Some(value) => value.parse().map_err(|()| ConfigError::InvalidValue {
                key: VARIANT_ENV_VAR,
                value,
                expected: "embedded or remote",
            })?,
            None => defaults.variant,
        };

        let failure_policy = match get(FAILURE_POLICY_ENV_VAR) {
            Some(value) => value.parse().map_err(|()| ConfigError::InvalidValue {
                key: FAILURE_POLICY_ENV_VAR,
                value,
                expected: "record or transient",
            })?,
            None => defaults.failure_policy,
        };

        let bind = match get(BIND_ENV_VAR) {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: BIND_ENV_VAR,
                value,
                expected: "a socket address such as 127.0.0.1:8501",
            })?,
            None => defaults.bind,
        };

        let probe_timeout = match get(PROBE_TIMEOUT_ENV_VAR) {
            Some(value) => match value.parse::<u64>() {
                Ok(millis) if millis > 0 => Duration::from_millis(millis),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: PROBE_TIMEOUT_ENV_VAR,
                        value,
                        expected: "a positive number of milliseconds",
                    })
                }
            },
            None => defaults.probe_timeout,
        };

        let mock_init_failures = match get(MOCK_INIT_FAILURES_ENV_VAR) {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: MOCK_INIT_FAILURES_ENV_VAR,
                value,
                expected: "a non-negative integer",
            })?,
            None => defaults.mock_init_failures,
        };

        let session_idle_ttl = match get(SESSION_IDLE_ENV_VAR) {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: SESSION_IDLE_ENV_VAR,
                        value,
                        expected: "a positive number of seconds",
                    })
                }
            },
            None => defaults.session_idle_ttl,
        };

        Ok(Self {
            variant,
            responder_id: get(RESPONDER_ENV_VAR).unwrap_or(defaults.responder_id),
            api_base_url: get(API_BASE_URL_ENV_VAR).unwrap_or(defaults.api_base_url),
            bind,
            failure_policy,
            probe_timeout,
            mock_init_failures,
            session_idle_ttl,
        })
    }

    /// Transport settings for the remote variant. `POST /chat` gets no timeout.
    #[must_use]
    pub fn api_config(&self) -> ChatApiConfig {
        ChatApiConfig::new(self.api_base_url.clone()).with_probe_timeout(self.probe_timeout)
    }
}
