use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ChatApiConfig;
use crate::error::ChatApiError;
use crate::headers::{build_headers, to_header_map};
use crate::payload::{ChatRequest, ChatResponse};
use crate::url::{normalize_chat_url, normalize_probe_url};

#[derive(Debug, Clone)]
pub struct ChatApiClient {
    http: Client,
    config: ChatApiConfig,
}

/// Result of the `GET /` liveness probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Availability {
    Available,
    Unavailable { reason: String },
}

impl Availability {
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl ChatApiClient {
    pub fn new(config: ChatApiConfig) -> Result<Self, ChatApiError> {
        let endpoint = normalize_chat_url(&config.base_url);
        Url::parse(&endpoint).map_err(|error| {
            ChatApiError::InvalidBaseUrl(format!("{}: {error}", config.base_url))
        })?;

        let http = Client::builder().build().map_err(ChatApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ChatApiConfig {
        &self.config
    }

    pub fn chat_endpoint(&self) -> String {
        normalize_chat_url(&self.config.base_url)
    }

    pub fn probe_endpoint(&self) -> String {
        normalize_probe_url(&self.config.base_url)
    }

    pub fn build_chat_request(
        &self,
        request: &ChatRequest,
    ) -> Result<reqwest::RequestBuilder, ChatApiError> {
        let headers = to_header_map(build_headers(&self.config))?;
        Ok(self
            .http
            .post(self.chat_endpoint())
            .headers(headers)
            .json(request))
    }

    /// Sends one chat turn. Exactly one request is made; there is no retry.
    ///
    /// Any status other than 200 is a failure carrying the body verbatim, empty
    /// or not. No timeout is applied.
    pub async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ChatApiError> {
        let response = self.build_chat_request(request)?.send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            let body = response.text().await.map_err(|error| {
                warn!(status = status.as_u16(), %error, "failed to read error body");
                ChatApiError::Request(error)
            })?;
            debug!(status = status.as_u16(), "chat endpoint returned failure status");
            return Err(ChatApiError::Status(status, body));
        }

        let bytes = response.bytes().await?;
        let parsed = serde_json::from_slice::<ChatResponse>(&bytes)?;
        Ok(parsed)
    }

    /// Probes `GET /` within the configured probe timeout.
    ///
    /// Never fails: every error is folded into [`Availability::Unavailable`].
    pub async fn probe(&self) -> Availability {
        let result = self
            .http
            .get(self.probe_endpoint())
            .timeout(self.config.probe_timeout)
            .send()
            .await;

        let availability = match result {
            Ok(response) if response.status() == StatusCode::OK => Availability::Available,
            Ok(response) => Availability::Unavailable {
                reason: format!("status {}", response.status().as_u16()),
            },
            Err(error) if error.is_timeout() => Availability::Unavailable {
                reason: "timed out".to_string(),
            },
            Err(error) => Availability::Unavailable {
                reason: error.to_string(),
            },
        };

        debug!(available = availability.is_available(), "chat service probe finished");
        availability
    }
}
