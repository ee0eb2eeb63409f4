//! Rotation trigger events
//!
//! Schedulers hand over a JSON object naming the secret, e.g. `{"SecretId": "hmac-key-1"}`.
//! Other fields are ignored.

use serde::{Deserialize, Serialize};

use crate::coordinator::RotationCoordinator;
use crate::error::RotationResult;
use crate::store::SecretStore;
use crate::types::SecretId;
use keyturn_key::KeyGenerator;

/// Trigger event naming the secret to rotate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationEvent {
    /// Secret to rotate
    #[serde(rename = "SecretId")]
    pub secret_id: SecretId,
}

impl RotationEvent {
    /// Parse an event from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Rotate the secret named by `event`
pub async fn handle_event<S, G>(
    coordinator: &RotationCoordinator<S, G>,
    event: &RotationEvent,
) -> RotationResult<()>
where
    S: SecretStore,
    G: KeyGenerator,
{
    coordinator.rotate(&event.secret_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scheduler_event() {
        let event = RotationEvent::from_json(
            r#"{"SecretId":"arn:aws:secretsmanager:us-east-1:123456789012:secret:hmac","Step":"createSecret"}"#,
        )
        .unwrap();
        assert_eq!(
            event.secret_id.as_str(),
            "arn:aws:secretsmanager:us-east-1:123456789012:secret:hmac"
        );
    }

    #[test]
    fn missing_secret_id_is_an_error() {
        assert!(RotationEvent::from_json(r#"{"secretId":"x"}"#).is_err());
    }
}
