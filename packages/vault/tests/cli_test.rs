//! Command parsing and execution against the in-memory store

mod common;

use clap::Parser;
use common::{SECRET, coordinator, seeded_store};
use keyturn_vault::cli::{Cli, CliError, CommandOutput, Commands, execute, read_event};
use keyturn_vault::{ConcurrencyPolicy, RotationConfig, SecretId, StoreOperation, VersionId};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn parses_rotate_with_global_flags() {
    let cli = Cli::try_parse_from([
        "keyturn",
        "rotate",
        "hmac-key-1",
        "--region",
        "eu-central-1",
        "--concurrency",
        "external",
        "--json",
    ])
    .unwrap();

    assert!(cli.json);
    assert!(matches!(cli.command, Commands::Rotate { ref secret_id } if secret_id == "hmac-key-1"));

    let config = cli.apply_overrides(RotationConfig::default()).unwrap();
    assert_eq!(config.region.as_deref(), Some("eu-central-1"));
    assert_eq!(config.concurrency, ConcurrencyPolicy::External);
}

#[test]
fn promote_requires_both_versions() {
    assert!(Cli::try_parse_from(["keyturn", "promote", "hmac-key-1", "--from", "v1"]).is_err());
    assert!(
        Cli::try_parse_from(["keyturn", "promote", "hmac-key-1", "--from", "v1", "--to", "v2"])
            .is_ok()
    );
}

#[test]
fn bad_endpoint_override_is_rejected() {
    let cli = Cli::try_parse_from(["keyturn", "--endpoint-url", "ftp://x", "inspect", "s"]).unwrap();
    assert!(cli.apply_overrides(RotationConfig::default()).is_err());
}

#[tokio::test]
async fn rotate_command_reports_secret() {
    let store = seeded_store();
    let output = execute(
        &coordinator(&store),
        Commands::Rotate {
            secret_id: SECRET.to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(output.render(false), "Rotated hmac-key-1");
    let json: serde_json::Value = serde_json::from_str(&output.render(true)).unwrap();
    assert_eq!(json["result"], "rotated");
    assert_eq!(json["secret_id"], SECRET);
}

#[tokio::test]
async fn inspect_marks_orphaned_versions() {
    let store = seeded_store();
    store.insert_version(SECRET, "v2", "BBB", &["AWSPENDING"]);

    let output = execute(
        &coordinator(&store),
        Commands::Inspect {
            secret_id: SECRET.to_string(),
        },
    )
    .await
    .unwrap();

    let CommandOutput::Inventory(inventory) = &output else {
        panic!("expected inventory, got {output:?}");
    };
    assert_eq!(inventory.active, Some(VersionId::from("v1")));
    assert_eq!(inventory.orphaned, vec![VersionId::from("v2")]);

    let text = output.render(false);
    assert!(text.contains("v2 [AWSPENDING]  (orphaned)"));
    assert!(text.ends_with("Active: v1"));
}

#[tokio::test]
async fn inspect_of_unknown_secret_fails() {
    let store = seeded_store();
    let err = execute(
        &coordinator(&store),
        Commands::Inspect {
            secret_id: "nope".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CliError::Inspect { .. }));
}

#[tokio::test]
async fn handle_rotates_secret_named_in_event_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"SecretId":"{SECRET}","Step":"createSecret"}}"#).unwrap();

    let store = seeded_store();
    let output = execute(
        &coordinator(&store),
        Commands::Handle {
            event: Some(file.path().to_path_buf()),
        },
    )
    .await
    .unwrap();

    assert!(matches!(output, CommandOutput::Rotated { ref secret_id } if secret_id == &SecretId::from(SECRET)));
    assert_eq!(store.calls(StoreOperation::MoveStageLabel), 1);
}

#[tokio::test]
async fn malformed_event_is_reported() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();

    let err = read_event(Some(file.path())).await.unwrap_err();
    assert!(matches!(err, CliError::EventFormat(_)));
}

#[tokio::test]
async fn rotation_failure_surfaces_through_cli_error() {
    let store = seeded_store();
    let err = execute(
        &coordinator(&store),
        Commands::Rotate {
            secret_id: "missing".to_string(),
        },
    )
    .await
    .unwrap_err();

    let CliError::Rotation(rotation) = err else {
        panic!("expected rotation error");
    };
    assert_eq!(rotation.secret_id().as_str(), "missing");
    assert!(rotation.to_string().contains("SNAPSHOT (ReadActiveVersion) failed for secret missing"));
}
