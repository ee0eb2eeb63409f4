//! Key generator used by the rotation coordinator

use crate::{EntropySource, HMAC_KEY_BYTES, KeyMaterial, Result};
use std::sync::{Mutex, PoisonError};

/// Anything able to produce fresh key material
pub trait KeyGenerator: Send + Sync {
    /// Produce new key material
    ///
    /// # Errors
    ///
    /// Returns an error if the entropy source is unavailable or unhealthy. Callers must treat
    /// this as fatal for the current operation.
    fn generate_key(&self) -> Result<KeyMaterial>;
}

/// Generates 256-bit HMAC keys from the operating-system CSPRNG
#[derive(Debug)]
pub struct HmacKeyGenerator {
    entropy: Mutex<EntropySource>,
}

impl HmacKeyGenerator {
    /// Generator for 256-bit keys
    #[must_use]
    pub fn new() -> Self {
        Self {
            entropy: Mutex::new(EntropySource::new()),
        }
    }

    /// Key size in bytes
    #[must_use]
    pub fn key_size_bytes(&self) -> usize {
        HMAC_KEY_BYTES
    }
}

impl Default for HmacKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator for HmacKeyGenerator {
    fn generate_key(&self) -> Result<KeyMaterial> {
        // A panic while holding the lock cannot leave the source half-updated
        let mut entropy = self.entropy.lock().unwrap_or_else(PoisonError::into_inner);
        let bytes = entropy.generate_bytes(HMAC_KEY_BYTES)?;
        log::debug!("Generated {} bytes of key material", bytes.len());
        Ok(KeyMaterial::from_bytes(&bytes))
    }
}
