//! Sidebar status for either variant.

use chat_api::Availability;
use serde::Serialize;
use tracing::{debug, warn};

use crate::guard::GuardStatus;
use crate::turn::TurnBackend;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum ServiceStatus {
    Embedded {
        responder: GuardStatus,
        construction_attempts: usize,
    },
    Remote {
        endpoint: String,
        service: Availability,
    },
}

impl ServiceStatus {
    /// Whether the backend looks usable right now. Chat is never blocked on it.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        match self {
            Self::Embedded { responder, .. } => responder.is_ready(),
            Self::Remote { service, .. } => service.is_available(),
        }
    }
}

/// Reads the guard state or runs the liveness probe. Never constructs the
/// responder.
pub async fn current_status(backend: &TurnBackend) -> ServiceStatus {
    match backend {
        TurnBackend::Embedded(guard) => ServiceStatus::Embedded {
            responder: guard.status(),
            construction_attempts: guard.construction_attempts(),
        },
        TurnBackend::Remote(client) => {
            let service = client.probe().await;
            match &service {
                Availability::Available => {
                    debug!(endpoint = %client.probe_endpoint(), "service available")
                }
                Availability::Unavailable { reason } => {
                    warn!(endpoint = %client.probe_endpoint(), %reason, "service unavailable")
                }
            }
            ServiceStatus::Remote {
                endpoint: client.chat_endpoint(),
                service,
            }
        }
    }
}
