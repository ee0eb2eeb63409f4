//! AWS client setup and configuration
//!
//! The SDK client is built exactly once per process and then shared; cloning
//! [`AwsSecretStore`] clones the underlying connection handle, not the connection.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_secretsmanager::Client;

use crate::config::{RotationConfig, StageLabels};

/// Secrets Manager connection plus the staging label new versions are written under
#[derive(Debug, Clone)]
pub struct AwsSecretStore {
    pub(crate) client: Client,
    pub(crate) stages: StageLabels,
}

impl AwsSecretStore {
    /// Load SDK configuration and build the client
    ///
    /// Region, profile and endpoint come from `config` when set; anything unset falls back
    /// to the SDK's default provider chain.
    pub async fn connect(config: &RotationConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        log::debug!(
            "Secrets Manager client ready (region: {})",
            sdk_config
                .region()
                .map_or_else(|| "<default>".to_string(), ToString::to_string)
        );

        Self::from_client(Client::new(&sdk_config), config.stages.clone())
    }

    /// Wrap an already configured client
    pub fn from_client(client: Client, stages: StageLabels) -> Self {
        Self { client, stages }
    }

    /// Underlying SDK client
    pub fn client(&self) -> &Client {
        &self.client
    }
}
