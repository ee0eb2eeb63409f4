//! # Keyturn Key Generation
//!
//! Produces fresh symmetric key material for HMAC secrets.
//!
//! ## Features
//!
//! - **Entropy**: bytes come straight from the operating-system CSPRNG
//! - **Health checks**: stuck entropy sources are rejected before material is handed out
//! - **Zeroizing material**: key bytes and their hex form are wiped on drop
//!
//! ## Quick Start
//!
//! ```rust
//! use keyturn_key::{HmacKeyGenerator, KeyGenerator};
//!
//! # fn main() -> Result<(), keyturn_key::KeyError> {
//! let generator = HmacKeyGenerator::new();
//! let key = generator.generate_key()?;
//! assert_eq!(key.expose_hex().len(), 64);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod entropy;
pub mod error;
pub mod generator;
pub mod material;

pub use entropy::EntropySource;
pub use error::{KeyError, Result};
pub use generator::{HmacKeyGenerator, KeyGenerator};
pub use material::KeyMaterial;

/// Size of a generated HMAC key in bytes (256 bits)
pub const HMAC_KEY_BYTES: usize = 32;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        HmacKeyGenerator, KeyError, KeyGenerator, KeyMaterial, Result,
    };
}
