//! In-process single-flight lock per secret

use dashmap::DashSet;

use crate::types::SecretId;

/// Secrets with a rotation or promotion currently running in this process
#[derive(Debug, Default)]
pub struct InFlightRegistry {
    secrets: DashSet<SecretId>,
}

impl InFlightRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `secret_id`, or `None` if another task holds it
    pub fn try_acquire(&self, secret_id: &SecretId) -> Option<FlightGuard<'_>> {
        if self.secrets.insert(secret_id.clone()) {
            Some(FlightGuard {
                registry: self,
                secret_id: secret_id.clone(),
            })
        } else {
            None
        }
    }

    /// Whether `secret_id` is currently claimed
    pub fn is_in_flight(&self, secret_id: &SecretId) -> bool {
        self.secrets.contains(secret_id)
    }
}

/// Releases the claim on drop
#[derive(Debug)]
pub struct FlightGuard<'a> {
    registry: &'a InFlightRegistry,
    secret_id: SecretId,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.registry.secrets.remove(&self.secret_id);
    }
}
