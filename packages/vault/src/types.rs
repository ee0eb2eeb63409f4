//! Identifiers and summaries shared by the stores and the coordinator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name or ARN of a secret
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretId(String);

/// Store-assigned, opaque version identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            /// Wrap an identifier string
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(SecretId);
string_id!(VersionId);

/// One version of a secret and the stage labels attached to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
    /// Store-assigned id
    pub version_id: VersionId,
    /// Stage labels attached to the version; empty for unlabelled versions
    pub stages: Vec<String>,
    /// Creation time, when the store reports one
    pub created_at: Option<DateTime<Utc>>,
}

impl VersionSummary {
    /// Whether `stage` is attached
    pub fn has_stage(&self, stage: &str) -> bool {
        self.stages.iter().any(|s| s == stage)
    }
}

/// Snapshot of every version of a secret, for operator cleanup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretInventory {
    /// Inspected secret
    pub secret_id: SecretId,
    /// Version holding the active label, if any
    pub active: Option<VersionId>,
    /// Every version, labelled or not
    pub versions: Vec<VersionSummary>,
    /// Versions holding neither the active nor the previous label
    pub orphaned: Vec<VersionId>,
}
