//! Operating-system entropy source with continuous health testing
//!
//! Bytes are drawn from the platform CSPRNG via `getrandom`. Every block passes two
//! lightweight health tests adapted from NIST SP 800-90B §4.4 and FIPS 140-2 before it
//! is released:
//!
//! - a repetition count test that rejects long runs of one byte value
//! - a continuous test that rejects a block identical to the previous one

use crate::{KeyError, Result};
use zeroize::Zeroizing;

/// Longest run of identical bytes tolerated in one block.
///
/// Sized for a false-positive rate of roughly 2^-40 per block at full entropy.
pub const REPETITION_CUTOFF: usize = 6;

/// CSPRNG-backed entropy source
#[derive(Default)]
pub struct EntropySource {
    previous_block: Option<Zeroizing<Vec<u8>>>,
}

impl EntropySource {
    /// Create a new entropy source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate `len` cryptographically secure random bytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The operating-system randomness source cannot be read
    /// - The generated block fails a health test
    pub fn generate_bytes(&mut self, len: usize) -> Result<Zeroizing<Vec<u8>>> {
        let mut bytes = Zeroizing::new(vec![0u8; len]);
        getrandom::fill(&mut bytes).map_err(|e| KeyError::EntropyUnavailable(e.to_string()))?;

        Self::repetition_count_test(&bytes)?;
        self.continuous_test(&bytes)?;

        self.previous_block = Some(bytes.clone());
        Ok(bytes)
    }

    /// Repetition Count Test - NIST SP 800-90B Section 4.4.1
    fn repetition_count_test(block: &[u8]) -> Result<()> {
        let mut run = 1usize;
        for pair in block.windows(2) {
            if pair[0] == pair[1] {
                run += 1;
                if run >= REPETITION_CUTOFF {
                    return Err(KeyError::InsufficientEntropy(format!(
                        "repetition count test failed: run of {run} identical bytes"
                    )));
                }
            } else {
                run = 1;
            }
        }
        Ok(())
    }

    /// Continuous random number generator test
    fn continuous_test(&self, block: &[u8]) -> Result<()> {
        match &self.previous_block {
            Some(previous) if !block.is_empty() && previous.as_slice() == block => {
                Err(KeyError::InsufficientEntropy(
                    "continuous test failed: block repeated previous output".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for EntropySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntropySource")
            .field("has_previous_block", &self.previous_block.is_some())
            .finish()
    }
}
