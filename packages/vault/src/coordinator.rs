//! Rotation coordinator
//!
//! Drives the four-step protocol against one shared store handle:
//!
//! 1. **SNAPSHOT** read the version holding the active label
//! 2. **GENERATE** produce fresh key material
//! 3. **WRITE** append it as a new, not yet active version
//! 4. **PROMOTE** move the active label from the snapshot version to the new one
//!
//! Each step gates the next. Nothing is retried here: the first failure aborts the run and
//! is returned with the secret id and failing step attached. A PROMOTE failure leaves the
//! old version active and the new one stranded; retry with [`RotationCoordinator::promote`]
//! rather than a fresh `rotate`, which would strand a second version.

use std::sync::Arc;

use keyturn_key::{HmacKeyGenerator, KeyGenerator};

use crate::config::{ConcurrencyPolicy, RotationConfig, StageLabels};
use crate::error::{RotationError, RotationResult, RotationStep};
use crate::flight::{FlightGuard, InFlightRegistry};
use crate::logging::log_rotation_event;
use crate::store::SecretStore;
use crate::tracker::VersionTracker;
use crate::types::{SecretId, VersionId};

/// Runs rotations and standalone promotions against one shared store
pub struct RotationCoordinator<S, G = HmacKeyGenerator> {
    store: Arc<S>,
    tracker: VersionTracker<S>,
    generator: G,
    stages: StageLabels,
    flights: Option<InFlightRegistry>,
}

impl<S: SecretStore> RotationCoordinator<S, HmacKeyGenerator> {
    /// Coordinator generating 256-bit HMAC keys
    pub fn new(store: Arc<S>, config: &RotationConfig) -> Self {
        Self::with_generator(store, HmacKeyGenerator::new(), config)
    }
}

impl<S: SecretStore, G: KeyGenerator> RotationCoordinator<S, G> {
    /// Coordinator using a custom key generator
    pub fn with_generator(store: Arc<S>, generator: G, config: &RotationConfig) -> Self {
        let flights = match config.concurrency {
            ConcurrencyPolicy::LocalLock => Some(InFlightRegistry::new()),
            ConcurrencyPolicy::External => None,
        };
        Self {
            tracker: VersionTracker::new(Arc::clone(&store), config.stages.clone()),
            store,
            generator,
            stages: config.stages.clone(),
            flights,
        }
    }

    /// Version tracker sharing this coordinator's store
    pub fn tracker(&self) -> &VersionTracker<S> {
        &self.tracker
    }

    /// Key generator in use
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Replace the active key of `secret_id` with freshly generated material.
    ///
    /// Issues exactly one read, one write and one label move on success.
    pub async fn rotate(&self, secret_id: &SecretId) -> RotationResult<()> {
        let _flight = self.claim(secret_id)?;

        match self.run_rotation(secret_id).await {
            Ok((old, new)) => {
                log_rotation_event(
                    "ROTATE",
                    secret_id.as_str(),
                    &format!("rotated HMAC key (previous={old} current={new})"),
                    true,
                );
                Ok(())
            }
            Err(err) => {
                log_rotation_event("ROTATE", secret_id.as_str(), &err.to_string(), false);
                if let Some(pending) = err.pending_version() {
                    log::warn!(
                        "Secret {secret_id}: version {pending} was written but not promoted; \
                         the previous version is still active. Retry the promotion alone."
                    );
                }
                Err(err)
            }
        }
    }

    /// Re-issue PROMOTE alone: move the active label from `from` to `to`.
    ///
    /// Meant for recovering from a rotation that failed at PROMOTE, using the ids that
    /// failure reported.
    pub async fn promote(
        &self,
        secret_id: &SecretId,
        from: &VersionId,
        to: &VersionId,
    ) -> RotationResult<()> {
        let _flight = self.claim(secret_id)?;

        let result = self.move_active_label(secret_id, from, to).await;
        match &result {
            Ok(()) => log_rotation_event(
                "PROMOTE",
                secret_id.as_str(),
                &format!("previous={from} current={to}"),
                true,
            ),
            Err(err) => log_rotation_event("PROMOTE", secret_id.as_str(), &err.to_string(), false),
        }
        result
    }

    async fn run_rotation(&self, secret_id: &SecretId) -> RotationResult<(VersionId, VersionId)> {
        trace_step(secret_id, RotationStep::Snapshot);
        let old = self
            .tracker
            .get_active_version(secret_id)
            .await
            .map_err(|e| RotationError::store(secret_id, RotationStep::Snapshot, e))?;

        trace_step(secret_id, RotationStep::Generate);
        let material =
            self.generator
                .generate_key()
                .map_err(|source| RotationError::KeyGeneration {
                    secret_id: secret_id.clone(),
                    source,
                })?;

        trace_step(secret_id, RotationStep::Write);
        let new = self
            .store
            .create_version(secret_id, material.expose_hex())
            .await
            .map_err(|e| RotationError::store(secret_id, RotationStep::Write, e))?;
        drop(material);

        trace_step(secret_id, RotationStep::Promote);
        self.move_active_label(secret_id, &old, &new).await?;

        Ok((old, new))
    }

    async fn move_active_label(
        &self,
        secret_id: &SecretId,
        from: &VersionId,
        to: &VersionId,
    ) -> RotationResult<()> {
        self.store
            .move_stage_label(secret_id, &self.stages.active, from, to)
            .await
            .map_err(|e| RotationError::promote(secret_id, to, e))
    }

    fn claim(&self, secret_id: &SecretId) -> RotationResult<Option<FlightGuard<'_>>> {
        match &self.flights {
            None => Ok(None),
            Some(registry) => registry
                .try_acquire(secret_id)
                .map(Some)
                .ok_or_else(|| RotationError::AlreadyInFlight {
                    secret_id: secret_id.clone(),
                }),
        }
    }
}

fn trace_step(secret_id: &SecretId, step: RotationStep) {
    tracing::debug!(secret_id = %secret_id, step = %step, "rotation step");
}

impl<S, G> std::fmt::Debug for RotationCoordinator<S, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationCoordinator")
            .field("stages", &self.stages)
            .field("local_lock", &self.flights.is_some())
            .finish_non_exhaustive()
    }
}
