use std::sync::Arc;

use chat_responder::ResponderFactory;
use chat_responder_mock::{MockResponderFactory, MOCK_RESPONDER_ID};

use crate::config::{ChatConfig, ConfigError};

pub const DEFAULT_RESPONDER_ID: &str = MOCK_RESPONDER_ID;

/// Resolves the embedded collaborator named by `responder_id`.
pub fn factory_for_id(
    responder_id: &str,
    config: &ChatConfig,
) -> Result<Arc<dyn ResponderFactory>, ConfigError> {
    match responder_id.trim() {
        MOCK_RESPONDER_ID => Ok(Arc::new(
            MockResponderFactory::new().failing_first(config.mock_init_failures),
        )),
        other => Err(ConfigError::UnknownResponder(other.to_string())),
    }
}

pub fn factory_from_config(config: &ChatConfig) -> Result<Arc<dyn ResponderFactory>, ConfigError> {
    factory_for_id(&config.responder_id, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_id_resolves_to_constructible_factory() {
        let factory =
            factory_for_id(DEFAULT_RESPONDER_ID, &ChatConfig::default()).expect("mock factory");
        let responder = factory.construct().expect("construct mock");
        assert_eq!(responder.profile().responder_id, MOCK_RESPONDER_ID);
    }

    #[test]
    fn configured_init_failures_are_applied() {
        let config = ChatConfig {
            mock_init_failures: 1,
            ..ChatConfig::default()
        };
        let factory = factory_from_config(&config).expect("mock factory");
        assert!(factory.construct().is_err());
        assert!(factory.construct().is_ok());
    }

    #[test]
    fn unknown_id_is_rejected() {
        let error = match factory_for_id("gpt-agent", &ChatConfig::default()) {
            Ok(_) => panic!("unknown responder must fail"),
            Err(error) => error,
        };
        assert_eq!(error, ConfigError::UnknownResponder("gpt-agent".to_string()));
        assert!(error.to_string().contains("Available responders: mock"));
    }
}
