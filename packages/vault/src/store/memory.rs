//! In-process secret store with Secrets Manager staging semantics
//!
//! Versions are append-only, `create_version` attaches the pending label, and moving the
//! active label hands the previous label to the version that lost it. Every call is
//! journaled and faults can be queued per operation, so tests can assert exactly which
//! store calls a rotation issued.

use super::SecretStore;
use crate::config::StageLabels;
use crate::error::{StoreError, StoreResult};
use crate::types::{SecretId, VersionId, VersionSummary};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use zeroize::Zeroizing;

/// Store calls, as counted by [`InMemorySecretStore::calls`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// [`SecretStore::read_active_version`]
    ReadActiveVersion,
    /// [`SecretStore::create_version`]
    CreateVersion,
    /// [`SecretStore::move_stage_label`]
    MoveStageLabel,
    /// [`SecretStore::list_versions`]
    ListVersions,
}

/// One journaled store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// Active version lookup
    ReadActiveVersion {
        /// Target secret
        secret_id: SecretId,
        /// Stage asked for
        stage: String,
    },
    /// New version written; only the payload length is kept
    CreateVersion {
        /// Target secret
        secret_id: SecretId,
        /// Length of the written payload
        payload_len: usize,
    },
    /// Label move
    MoveStageLabel {
        /// Target secret
        secret_id: SecretId,
        /// Label moved
        label: String,
        /// Version the label was taken from
        from: VersionId,
        /// Version the label was given to
        to: VersionId,
    },
    /// Version listing
    ListVersions {
        /// Target secret
        secret_id: SecretId,
    },
}

impl StoreCall {
    /// Kind of call
    pub fn operation(&self) -> StoreOperation {
        match self {
            StoreCall::ReadActiveVersion { .. } => StoreOperation::ReadActiveVersion,
            StoreCall::CreateVersion { .. } => StoreOperation::CreateVersion,
            StoreCall::MoveStageLabel { .. } => StoreOperation::MoveStageLabel,
            StoreCall::ListVersions { .. } => StoreOperation::ListVersions,
        }
    }
}

struct StoredVersion {
    id: VersionId,
    payload: Zeroizing<String>,
    stages: Vec<String>,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct SecretRecord {
    versions: Vec<StoredVersion>,
}

impl SecretRecord {
    fn version(&self, id: &VersionId) -> Option<&StoredVersion> {
        self.versions.iter().find(|v| &v.id == id)
    }

    fn next_version_id(&self) -> VersionId {
        let mut n = self.versions.len() + 1;
        loop {
            let candidate = VersionId::new(format!("v{n}"));
            if self.version(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    fn strip_stage(&mut self, stage: &str) {
        for version in &mut self.versions {
            version.stages.retain(|s| s != stage);
        }
    }

    fn add_stage(&mut self, id: &VersionId, stage: &str) {
        if let Some(version) = self.versions.iter_mut().find(|v| &v.id == id)
            && !version.stages.iter().any(|s| s == stage)
        {
            version.stages.push(stage.to_string());
        }
    }
}

/// Secret store kept entirely in memory
pub struct InMemorySecretStore {
    stages: StageLabels,
    secrets: Mutex<HashMap<SecretId, SecretRecord>>,
    faults: Mutex<HashMap<StoreOperation, VecDeque<StoreError>>>,
    journal: Mutex<Vec<StoreCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemorySecretStore {
    /// Empty store using the default Secrets Manager stage labels
    pub fn new() -> Self {
        Self::with_stages(StageLabels::default())
    }

    /// Empty store using custom stage labels
    pub fn with_stages(stages: StageLabels) -> Self {
        Self {
            stages,
            secrets: Mutex::new(HashMap::new()),
            faults: Mutex::new(HashMap::new()),
            journal: Mutex::new(Vec::new()),
        }
    }

    /// Create a secret whose only version `version_id` holds the active label
    pub fn with_secret(
        self,
        secret_id: impl Into<SecretId>,
        version_id: impl Into<VersionId>,
        payload: &str,
    ) -> Self {
        let active = self.stages.active.clone();
        self.insert_version(secret_id, version_id, payload, &[active.as_str()]);
        self
    }

    /// Append a version with explicit labels, bypassing the journal
    pub fn insert_version(
        &self,
        secret_id: impl Into<SecretId>,
        version_id: impl Into<VersionId>,
        payload: &str,
        stages: &[&str],
    ) {
        let mut secrets = lock(&self.secrets);
        let record = secrets.entry(secret_id.into()).or_default();
        for stage in stages {
            record.strip_stage(stage);
        }
        record.versions.push(StoredVersion {
            id: version_id.into(),
            payload: Zeroizing::new(payload.to_string()),
            stages: stages.iter().map(|s| (*s).to_string()).collect(),
            created_at: Utc::now(),
        });
    }

    /// Make the next call of `operation` fail with `error`. Faults queue up in order.
    pub fn fail_next(&self, operation: StoreOperation, error: StoreError) {
        lock(&self.faults).entry(operation).or_default().push_back(error);
    }

    /// Number of times `operation` was called, including failed calls
    pub fn calls(&self, operation: StoreOperation) -> usize {
        lock(&self.journal)
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// Every call issued so far, in order
    pub fn journal(&self) -> Vec<StoreCall> {
        lock(&self.journal).clone()
    }

    /// Payload of a specific version
    pub fn payload(&self, secret_id: &SecretId, version_id: &VersionId) -> Option<String> {
        lock(&self.secrets)
            .get(secret_id)
            .and_then(|record| record.version(version_id))
            .map(|v| v.payload.to_string())
    }

    /// Payload of the version currently holding the active label
    pub fn active_payload(&self, secret_id: &SecretId) -> Option<String> {
        let active = self.versions_with_stage(secret_id, &self.stages.active);
        match active.as_slice() {
            [only] => self.payload(secret_id, only),
            _ => None,
        }
    }

    /// Versions currently holding `stage`
    pub fn versions_with_stage(&self, secret_id: &SecretId, stage: &str) -> Vec<VersionId> {
        lock(&self.secrets)
            .get(secret_id)
            .map(|record| {
                record
                    .versions
                    .iter()
                    .filter(|v| v.stages.iter().any(|s| s == stage))
                    .map(|v| v.id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of versions ever written for `secret_id`
    pub fn version_count(&self, secret_id: &SecretId) -> usize {
        lock(&self.secrets)
            .get(secret_id)
            .map_or(0, |record| record.versions.len())
    }

    fn record(&self, call: StoreCall) -> StoreResult<()> {
        let operation = call.operation();
        lock(&self.journal).push(call);
        match lock(&self.faults)
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

impl Default for InMemorySecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemorySecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySecretStore")
            .field("stages", &self.stages)
            .field("secrets", &lock(&self.secrets).len())
            .finish_non_exhaustive()
    }
}

fn secret_not_found(secret_id: &SecretId) -> StoreError {
    StoreError::NotFound(format!("secret {secret_id}"))
}

impl SecretStore for InMemorySecretStore {
    async fn read_active_version(
        &self,
        secret_id: &SecretId,
        stage: &str,
    ) -> StoreResult<VersionId> {
        self.record(StoreCall::ReadActiveVersion {
            secret_id: secret_id.clone(),
            stage: stage.to_string(),
        })?;

        let secrets = lock(&self.secrets);
        let record = secrets
            .get(secret_id)
            .ok_or_else(|| secret_not_found(secret_id))?;
        record
            .versions
            .iter()
            .find(|v| v.stages.iter().any(|s| s == stage))
            .map(|v| v.id.clone())
            .ok_or_else(|| {
                StoreError::NotFound(format!("no version of {secret_id} holds stage {stage}"))
            })
    }

    async fn create_version(&self, secret_id: &SecretId, payload: &str) -> StoreResult<VersionId> {
        self.record(StoreCall::CreateVersion {
            secret_id: secret_id.clone(),
            payload_len: payload.len(),
        })?;

        let mut secrets = lock(&self.secrets);
        let record = secrets
            .get_mut(secret_id)
            .ok_or_else(|| secret_not_found(secret_id))?;

        let id = record.next_version_id();
        record.strip_stage(&self.stages.pending);
        record.versions.push(StoredVersion {
            id: id.clone(),
            payload: Zeroizing::new(payload.to_string()),
            stages: vec![self.stages.pending.clone()],
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn move_stage_label(
        &self,
        secret_id: &SecretId,
        label: &str,
        from: &VersionId,
        to: &VersionId,
    ) -> StoreResult<()> {
        self.record(StoreCall::MoveStageLabel {
            secret_id: secret_id.clone(),
            label: label.to_string(),
            from: from.clone(),
            to: to.clone(),
        })?;

        let mut secrets = lock(&self.secrets);
        let record = secrets
            .get_mut(secret_id)
            .ok_or_else(|| secret_not_found(secret_id))?;

        if record.version(to).is_none() {
            return Err(StoreError::NotFound(format!(
                "version {to} of secret {secret_id}"
            )));
        }
        let from_holds_label = record
            .version(from)
            .is_some_and(|v| v.stages.iter().any(|s| s == label));
        if !from_holds_label {
            return Err(StoreError::Conflict(format!(
                "stage {label} is not attached to version {from} of secret {secret_id}"
            )));
        }
        if from == to {
            return Ok(());
        }

        record.strip_stage(label);
        record.add_stage(to, label);
        if label == self.stages.active {
            record.strip_stage(&self.stages.previous);
            record.add_stage(from, &self.stages.previous);
        }
        Ok(())
    }

    async fn list_versions(&self, secret_id: &SecretId) -> StoreResult<Vec<VersionSummary>> {
        self.record(StoreCall::ListVersions {
            secret_id: secret_id.clone(),
        })?;

        let secrets = lock(&self.secrets);
        let record = secrets
            .get(secret_id)
            .ok_or_else(|| secret_not_found(secret_id))?;
        Ok(record
            .versions
            .iter()
            .map(|v| VersionSummary {
                version_id: v.id.clone(),
                stages: v.stages.clone(),
                created_at: Some(v.created_at),
            })
            .collect())
    }
}
