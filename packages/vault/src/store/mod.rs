//! Secret store capabilities consumed by the rotation protocol
//!
//! A store exposes exactly the calls the protocol needs. Each call is its own transaction;
//! nothing spans calls.

pub mod aws;
pub mod memory;

pub use aws::AwsSecretStore;
pub use memory::{InMemorySecretStore, StoreCall, StoreOperation};

use crate::error::StoreResult;
use crate::types::{SecretId, VersionId, VersionSummary};
use std::future::Future;

/// One logical connection to a versioned secret store.
///
/// Implementations are constructed once and shared (`Arc`) between the version tracker
/// and the rotation coordinator.
pub trait SecretStore: Send + Sync {
    /// Id of the version currently holding `stage`
    fn read_active_version(
        &self,
        secret_id: &SecretId,
        stage: &str,
    ) -> impl Future<Output = StoreResult<VersionId>> + Send;

    /// Append a new version holding `payload`. The new version must not receive the
    /// active label.
    fn create_version(
        &self,
        secret_id: &SecretId,
        payload: &str,
    ) -> impl Future<Output = StoreResult<VersionId>> + Send;

    /// Move `label` from `from` to `to` in a single request.
    ///
    /// Fails with [`StoreError::Conflict`](crate::StoreError::Conflict) when `from` does
    /// not currently hold `label`.
    fn move_stage_label(
        &self,
        secret_id: &SecretId,
        label: &str,
        from: &VersionId,
        to: &VersionId,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Every live version of the secret with its labels
    fn list_versions(
        &self,
        secret_id: &SecretId,
    ) -> impl Future<Output = StoreResult<Vec<VersionSummary>>> + Send;
}
