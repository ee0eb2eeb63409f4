//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ConcurrencyPolicy, ConfigError, RotationConfig};

/// Top-level arguments
#[derive(Debug, Parser)]
#[command(name = "keyturn")]
#[command(about = "Rotate HMAC keys held in AWS Secrets Manager")]
pub struct Cli {
    /// Store region (overrides AWS_SECRET_REGION)
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Named AWS profile for credentials
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Alternative Secrets Manager endpoint, e.g. http://localhost:4566
    #[arg(long, global = true)]
    pub endpoint_url: Option<String>,

    /// `local-lock` rejects overlapping rotations of one secret in this process;
    /// `external` trusts the scheduler to serialise them
    #[arg(long, global = true)]
    pub concurrency: Option<ConcurrencyPolicy>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Replace the active key with a freshly generated one
    ///
    /// Reads the active version, writes a new 256-bit key as a pending version, then moves
    /// the active label onto it in one request.
    ///
    /// Example usage:
    ///   keyturn rotate hmac-key-1
    Rotate {
        /// Secret name or ARN
        secret_id: String,
    },

    /// Retry only the label move after a rotation failed at PROMOTE
    ///
    /// Use the version ids reported by the failed rotation:
    ///   keyturn promote hmac-key-1 --from <old-version> --to <new-version>
    Promote {
        /// Secret name or ARN
        secret_id: String,
        /// Version currently holding the active label
        #[arg(long)]
        from: String,
        /// Version to make active
        #[arg(long)]
        to: String,
    },

    /// List versions and their labels, flagging unpromoted leftovers
    Inspect {
        /// Secret name or ARN
        secret_id: String,
    },

    /// Rotate the secret named in a trigger event (`{"SecretId": "..."}`)
    Handle {
        /// Event file; reads stdin when omitted or `-`
        #[arg(long)]
        event: Option<PathBuf>,
    },
}

impl Cli {
    /// Apply command-line overrides on top of `base`
    pub fn apply_overrides(&self, mut base: RotationConfig) -> Result<RotationConfig, ConfigError> {
        if let Some(region) = &self.region {
            base.region = Some(region.clone());
        }
        if let Some(profile) = &self.profile {
            base.profile = Some(profile.clone());
        }
        if let Some(endpoint) = &self.endpoint_url {
            base.endpoint_url = Some(endpoint.clone());
        }
        if let Some(policy) = self.concurrency {
            base.concurrency = policy;
        }
        base.validate()?;
        Ok(base)
    }
}
