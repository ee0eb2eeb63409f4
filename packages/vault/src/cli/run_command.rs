//! Command execution

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

use super::commands::{Cli, Commands};
use crate::config::{ConfigError, RotationConfig};
use crate::coordinator::RotationCoordinator;
use crate::error::{RotationError, StoreError};
use crate::event::{RotationEvent, handle_event};
use crate::store::{AwsSecretStore, SecretStore};
use crate::types::{SecretId, SecretInventory, VersionId};
use keyturn_key::KeyGenerator;

/// Command failures
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Invalid configuration or flag
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Rotation or promotion failed
    #[error(transparent)]
    Rotation(#[from] RotationError),
    /// Listing versions failed
    #[error("Inspect failed for secret {secret_id}: {source}")]
    Inspect {
        /// Inspected secret
        secret_id: SecretId,
        /// Store failure
        #[source]
        source: StoreError,
    },
    /// The event file or stdin could not be read
    #[error("Could not read rotation event: {0}")]
    EventIo(#[from] std::io::Error),
    /// The event is not valid JSON or lacks `SecretId`
    #[error("Malformed rotation event: {0}")]
    EventFormat(#[from] serde_json::Error),
}

/// Result of a successful command
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandOutput {
    /// A rotation completed
    Rotated {
        /// Rotated secret
        secret_id: SecretId,
    },
    /// A standalone promotion completed
    Promoted {
        /// Promoted secret
        secret_id: SecretId,
        /// Version that held the active label
        from: VersionId,
        /// Version now holding the active label
        to: VersionId,
    },
    /// Versions of a secret
    Inventory(SecretInventory),
}

impl CommandOutput {
    /// Human-readable text, or pretty JSON when `use_json` is set
    pub fn render(&self, use_json: bool) -> String {
        if use_json {
            return serde_json::to_string_pretty(self)
                .unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"));
        }

        match self {
            CommandOutput::Rotated { secret_id } => format!("Rotated {secret_id}"),
            CommandOutput::Promoted {
                secret_id,
                from,
                to,
            } => format!("Promoted {secret_id}: {from} -> {to}"),
            CommandOutput::Inventory(inventory) => {
                let mut out = format!("Secret {}\n", inventory.secret_id);
                for version in &inventory.versions {
                    let marker = if inventory.orphaned.contains(&version.version_id) {
                        "  (orphaned)"
                    } else {
                        ""
                    };
                    out.push_str(&format!(
                        "  {} [{}]{marker}\n",
                        version.version_id,
                        version.stages.join(", ")
                    ));
                }
                match &inventory.active {
                    Some(active) => out.push_str(&format!("Active: {active}")),
                    None => out.push_str("Active: <none>"),
                }
                out
            }
        }
    }
}

/// Entry point for the binary
#[tokio::main]
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    use clap::Parser;

    let cli = Cli::parse();
    let config = cli.apply_overrides(RotationConfig::from_env()?)?;

    // One client for the whole process, shared by tracker and coordinator
    let store = Arc::new(AwsSecretStore::connect(&config).await);
    let coordinator = RotationCoordinator::new(store, &config);

    let output = execute(&coordinator, cli.command).await?;
    println!("{}", output.render(cli.json));
    Ok(())
}

/// Run one command against `coordinator`
pub async fn execute<S, G>(
    coordinator: &RotationCoordinator<S, G>,
    command: Commands,
) -> Result<CommandOutput, CliError>
where
    S: SecretStore,
    G: KeyGenerator,
{
    match command {
        Commands::Rotate { secret_id } => {
            let secret_id = SecretId::from(secret_id);
            coordinator.rotate(&secret_id).await?;
            Ok(CommandOutput::Rotated { secret_id })
        }

        Commands::Promote {
            secret_id,
            from,
            to,
        } => {
            let secret_id = SecretId::from(secret_id);
            let (from, to) = (VersionId::from(from), VersionId::from(to));
            coordinator.promote(&secret_id, &from, &to).await?;
            Ok(CommandOutput::Promoted {
                secret_id,
                from,
                to,
            })
        }

        Commands::Inspect { secret_id } => {
            let secret_id = SecretId::from(secret_id);
            let inventory = coordinator
                .tracker()
                .inventory(&secret_id)
                .await
                .map_err(|source| CliError::Inspect {
                    secret_id: secret_id.clone(),
                    source,
                })?;
            Ok(CommandOutput::Inventory(inventory))
        }

        Commands::Handle { event } => {
            let event = read_event(event.as_deref()).await?;
            handle_event(coordinator, &event).await?;
            Ok(CommandOutput::Rotated {
                secret_id: event.secret_id,
            })
        }
    }
}

/// Read a trigger event from `path`, or stdin when `path` is `None` or `-`
pub async fn read_event(path: Option<&Path>) -> Result<RotationEvent, CliError> {
    let raw = match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path).await?,
        _ => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };
    Ok(RotationEvent::from_json(&raw)?)
}
