//! Active-version lookup, taken before any mutation

use std::sync::Arc;

use crate::config::StageLabels;
use crate::error::StoreResult;
use crate::store::SecretStore;
use crate::types::{SecretId, SecretInventory, VersionId};

/// Reads which version of a secret currently holds the active label
#[derive(Debug)]
pub struct VersionTracker<S> {
    store: Arc<S>,
    stages: StageLabels,
}

impl<S: SecretStore> VersionTracker<S> {
    /// Tracker over a shared store handle
    pub fn new(store: Arc<S>, stages: StageLabels) -> Self {
        Self { store, stages }
    }

    /// Version holding the active stage. Asks for the stage explicitly; the newest version
    /// may be pending or abandoned.
    pub async fn get_active_version(&self, secret_id: &SecretId) -> StoreResult<VersionId> {
        tracing::debug!(secret_id = %secret_id, stage = %self.stages.active, "reading active version");
        self.store
            .read_active_version(secret_id, &self.stages.active)
            .await
    }

    /// All versions of the secret, flagging those stranded by failed promotions
    pub async fn inventory(&self, secret_id: &SecretId) -> StoreResult<SecretInventory> {
        let versions = self.store.list_versions(secret_id).await?;

        let active = versions
            .iter()
            .find(|v| v.has_stage(&self.stages.active))
            .map(|v| v.version_id.clone());
        let orphaned = versions
            .iter()
            .filter(|v| !v.has_stage(&self.stages.active) && !v.has_stage(&self.stages.previous))
            .map(|v| v.version_id.clone())
            .collect();

        Ok(SecretInventory {
            secret_id: secret_id.clone(),
            active,
            versions,
            orphaned,
        })
    }
}
