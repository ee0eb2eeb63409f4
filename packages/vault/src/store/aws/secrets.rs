//! AWS Secrets Manager operations used by rotation

use chrono::DateTime;
use uuid::Uuid;

use super::client::AwsSecretStore;
use super::errors::classify_sdk_error;
use crate::error::{StoreError, StoreResult};
use crate::store::SecretStore;
use crate::types::{SecretId, VersionId, VersionSummary};

impl SecretStore for AwsSecretStore {
    /// `GetSecretValue` pinned to `stage`; only the version id is kept
    async fn read_active_version(
        &self,
        secret_id: &SecretId,
        stage: &str,
    ) -> StoreResult<VersionId> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id.as_str())
            .version_stage(stage)
            .send()
            .await
            .map_err(|e| classify_sdk_error("GetSecretValue", e))?;

        output.version_id().map(VersionId::from).ok_or_else(|| {
            StoreError::Unexpected(format!(
                "GetSecretValue returned no VersionId for {secret_id}"
            ))
        })
    }

    /// `PutSecretValue` under the pending stage so `AWSCURRENT` stays where it is.
    ///
    /// The client request token makes SDK-level retries of this call land on the same
    /// version instead of creating extra ones.
    async fn create_version(&self, secret_id: &SecretId, payload: &str) -> StoreResult<VersionId> {
        let output = self
            .client
            .put_secret_value()
            .secret_id(secret_id.as_str())
            .secret_string(payload)
            .version_stages(self.stages.pending.as_str())
            .client_request_token(Uuid::new_v4().to_string())
            .send()
            .await
            .map_err(|e| classify_sdk_error("PutSecretValue", e))?;

        output.version_id().map(VersionId::from).ok_or_else(|| {
            StoreError::Unexpected(format!(
                "PutSecretValue returned no VersionId for {secret_id}"
            ))
        })
    }

    async fn move_stage_label(
        &self,
        secret_id: &SecretId,
        label: &str,
        from: &VersionId,
        to: &VersionId,
    ) -> StoreResult<()> {
        self.client
            .update_secret_version_stage()
            .secret_id(secret_id.as_str())
            .version_stage(label)
            .move_to_version_id(to.as_str())
            .remove_from_version_id(from.as_str())
            .send()
            .await
            .map_err(|e| classify_sdk_error("UpdateSecretVersionStage", e))?;

        Ok(())
    }

    async fn list_versions(&self, secret_id: &SecretId) -> StoreResult<Vec<VersionSummary>> {
        let mut summaries = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_secret_version_ids()
                .secret_id(secret_id.as_str())
                // Versions without any label are "deprecated"; stranded ones must show up
                .include_deprecated(true)
                .max_results(100);
            if let Some(token) = next_token.take() {
                request = request.next_token(token);
            }

            let output = request
                .send()
                .await
                .map_err(|e| classify_sdk_error("ListSecretVersionIds", e))?;

            for entry in output.versions() {
                let Some(version_id) = entry.version_id() else {
                    continue;
                };
                summaries.push(VersionSummary {
                    version_id: VersionId::from(version_id),
                    stages: entry.version_stages().to_vec(),
                    created_at: entry
                        .created_date()
                        .and_then(|d| DateTime::from_timestamp(d.secs(), d.subsec_nanos())),
                });
            }

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(summaries)
    }
}
