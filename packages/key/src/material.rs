//! Hex-encoded key material

use crate::{KeyError, Result};
use std::fmt;
use zeroize::Zeroizing;

/// Freshly generated key material in its storable, printable form.
///
/// The material is kept as lowercase hex so it can be written verbatim as a secret string.
/// Both the hex text and any decoded bytes are wiped when dropped. `Debug` never prints
/// the key.
#[derive(Clone)]
pub struct KeyMaterial {
    hex: Zeroizing<String>,
}

impl KeyMaterial {
    /// Encode raw key bytes
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            hex: Zeroizing::new(hex::encode(bytes)),
        }
    }

    /// The hex encoding, as written to the secret store
    #[must_use]
    pub fn expose_hex(&self) -> &str {
        &self.hex
    }

    /// Decode back to raw bytes
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidKeyFormat`] if the stored encoding is corrupt.
    pub fn to_bytes(&self) -> Result<Zeroizing<Vec<u8>>> {
        hex::decode(self.hex.as_str())
            .map(Zeroizing::new)
            .map_err(|e| KeyError::InvalidKeyFormat(e.to_string()))
    }

    /// Length of the decoded key in bytes
    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.hex.len() / 2
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("len_bytes", &self.len_bytes())
            .finish_non_exhaustive()
    }
}
