//! # Keyturn Vault
//!
//! HMAC key rotation against a versioned secret store.
//!
//! A rotation snapshots the active version, generates fresh key material, writes it as a
//! new unpromoted version and then moves the active label onto it in one store request.
//! The store is injected once as an `Arc` and shared by every component.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use keyturn_vault::{AwsSecretStore, RotationConfig, RotationCoordinator, SecretId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RotationConfig::from_env()?;
//! let store = Arc::new(AwsSecretStore::connect(&config).await);
//! let coordinator = RotationCoordinator::new(store, &config);
//! coordinator.rotate(&SecretId::from("hmac-key-1")).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod flight;
pub mod logging;
pub mod store;
pub mod tracker;
pub mod types;

pub use config::{ConcurrencyPolicy, ConfigError, RotationConfig, StageLabels};
pub use coordinator::RotationCoordinator;
pub use error::{RotationError, RotationResult, RotationStep, StoreError, StoreResult};
pub use event::{RotationEvent, handle_event};
pub use store::{AwsSecretStore, InMemorySecretStore, SecretStore, StoreCall, StoreOperation};
pub use tracker::VersionTracker;
pub use types::{SecretId, SecretInventory, VersionId, VersionSummary};
