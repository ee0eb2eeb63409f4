//! Rotation configuration
//!
//! Settings come from the environment and can be overridden on the command line.
//! Unset values fall back to Secrets Manager's own defaults.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Region of the secret store endpoint
pub const REGION_ENV: &str = "AWS_SECRET_REGION";
/// Named AWS credentials profile
pub const PROFILE_ENV: &str = "KEYTURN_AWS_PROFILE";
/// Alternative Secrets Manager endpoint URL
pub const ENDPOINT_URL_ENV: &str = "KEYTURN_ENDPOINT_URL";
/// Active stage label override
pub const ACTIVE_STAGE_ENV: &str = "KEYTURN_ACTIVE_STAGE";
/// Pending stage label override
pub const PENDING_STAGE_ENV: &str = "KEYTURN_PENDING_STAGE";
/// Previous stage label override
pub const PREVIOUS_STAGE_ENV: &str = "KEYTURN_PREVIOUS_STAGE";
/// Concurrency policy, `local-lock` or `external`
pub const CONCURRENCY_ENV: &str = "KEYTURN_CONCURRENCY";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A setting could not be parsed or is out of range
    #[error("Invalid value {value:?} for {setting}: {reason}")]
    InvalidValue {
        /// Environment variable or flag name
        setting: &'static str,
        /// Rejected value
        value: String,
        /// What was expected instead
        reason: String,
    },
    /// Stage labels are empty or reuse one name
    #[error("Stage labels must be non-empty and distinct (active={active:?}, pending={pending:?}, previous={previous:?})")]
    StageLabels {
        /// Configured active label
        active: String,
        /// Configured pending label
        pending: String,
        /// Configured previous label
        previous: String,
    },
}

/// Everything a rotation run needs to know about its environment
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Store region; `None` falls back to the SDK's default provider chain
    #[serde(default)]
    pub region: Option<String>,
    /// Named credentials profile
    #[serde(default)]
    pub profile: Option<String>,
    /// Override endpoint, e.g. LocalStack at `http://localhost:4566`
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Stage label names
    #[serde(default)]
    pub stages: StageLabels,
    /// How overlapping rotations are kept apart
    #[serde(default)]
    pub concurrency: ConcurrencyPolicy,
}

/// Stage label names as understood by the store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageLabels {
    /// Label consumers read; exactly one version holds it
    #[serde(default = "default_active_stage")]
    pub active: String,
    /// Label attached to a freshly written, not yet promoted version
    #[serde(default = "default_pending_stage")]
    pub pending: String,
    /// Label the store moves onto the version that just lost `active`
    #[serde(default = "default_previous_stage")]
    pub previous: String,
}

fn default_active_stage() -> String {
    "AWSCURRENT".to_string()
}

fn default_pending_stage() -> String {
    "AWSPENDING".to_string()
}

fn default_previous_stage() -> String {
    "AWSPREVIOUS".to_string()
}

impl Default for StageLabels {
    fn default() -> Self {
        Self {
            active: default_active_stage(),
            pending: default_pending_stage(),
            previous: default_previous_stage(),
        }
    }
}

/// How overlapping rotations of one secret are kept apart.
///
/// The store offers no cross-call locking, so two coordinators racing on the same secret
/// can each promote their own version and strand the other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConcurrencyPolicy {
    /// Reject a second rotation of the same secret within this process
    #[default]
    LocalLock,
    /// The deployer guarantees at most one rotation per secret at a time
    External,
}

impl FromStr for ConcurrencyPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local-lock" | "local" | "lock" => Ok(ConcurrencyPolicy::LocalLock),
            "external" | "none" => Ok(ConcurrencyPolicy::External),
            _ => Err(ConfigError::InvalidValue {
                setting: CONCURRENCY_ENV,
                value: value.to_string(),
                reason: "expected `local-lock` or `external`".to_string(),
            }),
        }
    }
}

impl RotationConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut config = RotationConfig {
            region: get(REGION_ENV),
            profile: get(PROFILE_ENV),
            endpoint_url: get(ENDPOINT_URL_ENV),
            ..Default::default()
        };

        if let Some(active) = get(ACTIVE_STAGE_ENV) {
            config.stages.active = active;
        }
        if let Some(pending) = get(PENDING_STAGE_ENV) {
            config.stages.pending = pending;
        }
        if let Some(previous) = get(PREVIOUS_STAGE_ENV) {
            config.stages.previous = previous;
        }
        if let Some(policy) = get(CONCURRENCY_ENV) {
            config.concurrency = policy.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check stage labels and the endpoint URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        let StageLabels {
            active,
            pending,
            previous,
        } = &self.stages;
        let empty = active.is_empty() || pending.is_empty() || previous.is_empty();
        let clash = active == pending || active == previous || pending == previous;
        if empty || clash {
            return Err(ConfigError::StageLabels {
                active: active.clone(),
                pending: pending.clone(),
                previous: previous.clone(),
            });
        }

        if let Some(url) = &self.endpoint_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                setting: ENDPOINT_URL_ENV,
                value: url.clone(),
                reason: "endpoint must be an http(s) URL".to_string(),
            });
        }

        Ok(())
    }
}
