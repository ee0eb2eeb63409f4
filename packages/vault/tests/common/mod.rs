//! Shared fixtures for coordinator tests

#![allow(dead_code)]

use keyturn_key::{HmacKeyGenerator, KeyError, KeyGenerator, KeyMaterial};
use keyturn_vault::{
    InMemorySecretStore, RotationConfig, RotationCoordinator, SecretStore,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Real generator that counts how often it was asked for a key
#[derive(Debug, Default)]
pub struct CountingGenerator {
    inner: HmacKeyGenerator,
    calls: AtomicUsize,
}

impl CountingGenerator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl KeyGenerator for CountingGenerator {
    fn generate_key(&self) -> Result<KeyMaterial, KeyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.generate_key()
    }
}

/// Generator whose entropy source is gone
#[derive(Debug, Default)]
pub struct UnavailableEntropy;

impl KeyGenerator for UnavailableEntropy {
    fn generate_key(&self) -> Result<KeyMaterial, KeyError> {
        Err(KeyError::EntropyUnavailable("getrandom: no entropy".to_string()))
    }
}

pub const SECRET: &str = "hmac-key-1";

/// Store holding `hmac-key-1` with active version `v1` = `AAA`
pub fn seeded_store() -> Arc<InMemorySecretStore> {
    Arc::new(InMemorySecretStore::new().with_secret(SECRET, "v1", "AAA"))
}

pub fn coordinator<S: SecretStore>(
    store: &Arc<S>,
) -> RotationCoordinator<S, CountingGenerator> {
    RotationCoordinator::with_generator(
        Arc::clone(store),
        CountingGenerator::default(),
        &RotationConfig::default(),
    )
}
