//! Store and rotation error types

use crate::types::{SecretId, VersionId};
use keyturn_key::KeyError;
use std::fmt;

/// Failure reported by a secret store call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The secret, version or stage does not exist
    #[error("Not found: {0}")]
    NotFound(String),
    /// Credentials are missing, expired or not authorised
    #[error("Access denied: {0}")]
    Access(String),
    /// Throttling, timeouts and service-side failures
    #[error("Transient store failure: {0}")]
    Transient(String),
    /// The label move did not match the versions currently labelled
    #[error("Conflict: {0}")]
    Conflict(String),
    /// Anything the store reported that fits no other kind
    #[error("Unexpected store response: {0}")]
    Unexpected(String),
}

impl StoreError {
    /// Whether re-issuing the same call later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

/// Result type for store calls
pub type StoreResult<T> = Result<T, StoreError>;

/// The four rotation states, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationStep {
    /// Read the version holding the active label
    Snapshot,
    /// Produce new key material
    Generate,
    /// Append the material as an unpromoted version
    Write,
    /// Move the active label onto the new version
    Promote,
}

impl RotationStep {
    /// Name of the underlying operation this step performs
    pub fn operation(self) -> &'static str {
        match self {
            RotationStep::Snapshot => "ReadActiveVersion",
            RotationStep::Generate => "GenerateKey",
            RotationStep::Write => "CreateVersion",
            RotationStep::Promote => "MoveStageLabel",
        }
    }
}

impl fmt::Display for RotationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RotationStep::Snapshot => "SNAPSHOT",
            RotationStep::Generate => "GENERATE",
            RotationStep::Write => "WRITE",
            RotationStep::Promote => "PROMOTE",
        };
        write!(f, "{name} ({})", self.operation())
    }
}

/// Failure of a rotation or promotion attempt.
///
/// Always carries the secret id and the failing step. A failure at
/// [`RotationStep::Promote`] also carries the version that was written but never
/// promoted, so an operator can retry the promotion alone.
#[derive(Debug, thiserror::Error)]
pub enum RotationError {
    /// A store call failed
    #[error("{step} failed for secret {secret_id}: {source}")]
    Store {
        /// Secret being rotated
        secret_id: SecretId,
        /// Step whose store call failed
        step: RotationStep,
        /// Written but unpromoted version, set only for PROMOTE failures
        pending_version: Option<VersionId>,
        /// Store failure
        #[source]
        source: StoreError,
    },
    /// The key generator could not produce material
    #[error("GENERATE (GenerateKey) failed for secret {secret_id}: {source}")]
    KeyGeneration {
        /// Secret being rotated
        secret_id: SecretId,
        /// Generator failure
        #[source]
        source: KeyError,
    },
    /// Another rotation or promotion of this secret holds the local lock
    #[error("rotation of secret {secret_id} is already in flight in this process")]
    AlreadyInFlight {
        /// Contended secret
        secret_id: SecretId,
    },
}

impl RotationError {
    pub(crate) fn store(secret_id: &SecretId, step: RotationStep, source: StoreError) -> Self {
        RotationError::Store {
            secret_id: secret_id.clone(),
            step,
            pending_version: None,
            source,
        }
    }

    pub(crate) fn promote(secret_id: &SecretId, pending: &VersionId, source: StoreError) -> Self {
        RotationError::Store {
            secret_id: secret_id.clone(),
            step: RotationStep::Promote,
            pending_version: Some(pending.clone()),
            source,
        }
    }

    /// Secret the failed attempt was acting on
    pub fn secret_id(&self) -> &SecretId {
        match self {
            RotationError::Store { secret_id, .. }
            | RotationError::KeyGeneration { secret_id, .. }
            | RotationError::AlreadyInFlight { secret_id } => secret_id,
        }
    }

    /// Step that failed. Lock contention is reported against SNAPSHOT since nothing was read yet.
    pub fn step(&self) -> RotationStep {
        match self {
            RotationError::Store { step, .. } => *step,
            RotationError::KeyGeneration { .. } => RotationStep::Generate,
            RotationError::AlreadyInFlight { .. } => RotationStep::Snapshot,
        }
    }

    /// Name of the operation that failed
    pub fn operation(&self) -> &'static str {
        match self {
            RotationError::AlreadyInFlight { .. } => "AcquireRotationLock",
            _ => self.step().operation(),
        }
    }

    /// Underlying store failure, if a store call failed
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            RotationError::Store { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Version left unpromoted by a failed PROMOTE
    pub fn pending_version(&self) -> Option<&VersionId> {
        match self {
            RotationError::Store {
                pending_version, ..
            } => pending_version.as_ref(),
            _ => None,
        }
    }

    /// Whether calling `rotate` again starts from a clean slate.
    ///
    /// After a PROMOTE failure a fresh rotation would strand a second unpromoted version;
    /// retry the promotion instead.
    pub fn safe_to_retry(&self) -> bool {
        self.step() != RotationStep::Promote
    }
}

/// Result type for rotation operations
pub type RotationResult<T> = Result<T, RotationError>;
