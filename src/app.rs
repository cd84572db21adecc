use std::sync::Arc;

use chat_api::{ChatApiClient, ChatApiError};
use session_store::SessionStore;
use thiserror::Error;
use tracing::info;

use crate::config::{ChatConfig, ConfigError, Variant};
use crate::guard::ResponderGuard;
use crate::responders::factory_from_config;
use crate::server::AppState;
use crate::turn::{TurnBackend, TurnRunner};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("remote chat client: {0}")]
    Api(#[from] ChatApiError),
}

/// Builds the variant's backend. The embedded responder is not constructed
/// here; that happens lazily on first use.
pub fn backend_from_config(config: &ChatConfig) -> Result<TurnBackend, StartupError> {
    match config.variant {
        Variant::Embedded => {
            let factory = factory_from_config(config)?;
            info!(responder = %config.responder_id, "embedded responder registered");
            Ok(TurnBackend::Embedded(Arc::new(ResponderGuard::new(factory))))
        }
        Variant::Remote => {
            let client = ChatApiClient::new(config.api_config())?;
            info!(endpoint = %client.chat_endpoint(), "remote chat service configured");
            Ok(TurnBackend::Remote(client))
        }
    }
}

pub fn state_from_config(config: &ChatConfig) -> Result<AppState, StartupError> {
    let backend = backend_from_config(config)?;
    let runner = TurnRunner::new(backend, config.failure_policy);
    Ok(AppState::with_sessions(
        runner,
        SessionStore::with_idle_ttl(config.session_idle_ttl),
    ))
}
