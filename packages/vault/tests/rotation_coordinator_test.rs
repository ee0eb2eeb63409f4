//! Rotation protocol behaviour against the in-memory store

mod common;

use common::{SECRET, UnavailableEntropy, coordinator, seeded_store};
use keyturn_vault::{
    InMemorySecretStore, RotationConfig, RotationCoordinator, RotationError, RotationStep,
    SecretId, StoreCall, StoreError, StoreOperation, VersionId,
};
use std::sync::Arc;

fn secret() -> SecretId {
    SecretId::from(SECRET)
}

#[tokio::test]
async fn rotation_writes_once_and_moves_label_once() {
    let store = seeded_store();
    let coordinator = coordinator(&store);

    coordinator.rotate(&secret()).await.unwrap();

    assert_eq!(coordinator.generator().calls(), 1);
    assert_eq!(
        store.journal(),
        vec![
            StoreCall::ReadActiveVersion {
                secret_id: secret(),
                stage: "AWSCURRENT".to_string(),
            },
            StoreCall::CreateVersion {
                secret_id: secret(),
                payload_len: 64,
            },
            StoreCall::MoveStageLabel {
                secret_id: secret(),
                label: "AWSCURRENT".to_string(),
                from: VersionId::from("v1"),
                to: VersionId::from("v2"),
            },
        ]
    );

    let written = store.payload(&secret(), &VersionId::from("v2")).unwrap();
    assert_eq!(written.len(), 64);
    assert!(written.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn exactly_one_version_is_active_with_new_material() {
    let store = seeded_store();
    coordinator(&store).rotate(&secret()).await.unwrap();

    let active = store.versions_with_stage(&secret(), "AWSCURRENT");
    assert_eq!(active, vec![VersionId::from("v2")]);

    let active_payload = store.active_payload(&secret()).unwrap();
    assert_ne!(active_payload, "AAA");

    // Old material survives untouched and is labelled previous
    assert_eq!(
        store.payload(&secret(), &VersionId::from("v1")).as_deref(),
        Some("AAA")
    );
    assert_eq!(
        store.versions_with_stage(&secret(), "AWSPREVIOUS"),
        vec![VersionId::from("v1")]
    );
}

#[tokio::test]
async fn repeated_rotations_keep_single_active_version() {
    let store = seeded_store();
    let coordinator = coordinator(&store);

    let mut seen = vec!["AAA".to_string()];
    for _ in 0..5 {
        coordinator.rotate(&secret()).await.unwrap();
        let active = store.versions_with_stage(&secret(), "AWSCURRENT");
        assert_eq!(active.len(), 1);
        let payload = store.active_payload(&secret()).unwrap();
        assert!(!seen.contains(&payload));
        seen.push(payload);
    }
    assert_eq!(store.version_count(&secret()), 6);
    assert_eq!(store.calls(StoreOperation::MoveStageLabel), 5);
}

#[tokio::test]
async fn missing_secret_aborts_before_any_mutation() {
    let store = Arc::new(InMemorySecretStore::new());
    let coordinator = coordinator(&store);

    let err = coordinator.rotate(&secret()).await.unwrap_err();

    assert!(matches!(err.store_error(), Some(StoreError::NotFound(_))));
    assert_eq!(err.step(), RotationStep::Snapshot);
    assert_eq!(err.secret_id(), &secret());
    assert_eq!(err.operation(), "ReadActiveVersion");
    assert!(err.safe_to_retry());
    assert_eq!(coordinator.generator().calls(), 0);
    assert_eq!(store.calls(StoreOperation::CreateVersion), 0);
    assert_eq!(store.calls(StoreOperation::MoveStageLabel), 0);
}

#[tokio::test]
async fn snapshot_failures_propagate_their_kind() {
    for fault in [
        StoreError::Access("denied".to_string()),
        StoreError::Transient("503".to_string()),
    ] {
        let store = seeded_store();
        store.fail_next(StoreOperation::ReadActiveVersion, fault.clone());

        let err = coordinator(&store).rotate(&secret()).await.unwrap_err();

        assert_eq!(err.store_error(), Some(&fault));
        assert_eq!(store.calls(StoreOperation::CreateVersion), 0);
        assert_eq!(store.calls(StoreOperation::MoveStageLabel), 0);
    }
}

#[tokio::test]
async fn generator_failure_aborts_before_write() {
    let store = seeded_store();
    let coordinator = RotationCoordinator::with_generator(
        Arc::clone(&store),
        UnavailableEntropy,
        &RotationConfig::default(),
    );

    let err = coordinator.rotate(&secret()).await.unwrap_err();

    assert!(matches!(err, RotationError::KeyGeneration { .. }));
    assert_eq!(err.step(), RotationStep::Generate);
    assert_eq!(store.calls(StoreOperation::CreateVersion), 0);
    assert_eq!(store.calls(StoreOperation::MoveStageLabel), 0);
    assert_eq!(store.active_payload(&secret()).as_deref(), Some("AAA"));
}

#[tokio::test]
async fn write_failure_never_moves_label() {
    let store = seeded_store();
    store.fail_next(
        StoreOperation::CreateVersion,
        StoreError::Transient("connection reset".to_string()),
    );

    let err = coordinator(&store).rotate(&secret()).await.unwrap_err();

    assert_eq!(err.step(), RotationStep::Write);
    assert!(err.safe_to_retry());
    assert_eq!(store.calls(StoreOperation::MoveStageLabel), 0);
    assert_eq!(
        store.versions_with_stage(&secret(), "AWSCURRENT"),
        vec![VersionId::from("v1")]
    );
    assert_eq!(store.active_payload(&secret()).as_deref(), Some("AAA"));
}

#[tokio::test]
async fn promote_failure_leaves_old_version_active() {
    let store = seeded_store();
    store.fail_next(
        StoreOperation::MoveStageLabel,
        StoreError::Transient("throttled".to_string()),
    );

    let err = coordinator(&store).rotate(&secret()).await.unwrap_err();

    assert_eq!(err.step(), RotationStep::Promote);
    assert_eq!(err.pending_version(), Some(&VersionId::from("v2")));
    assert!(!err.safe_to_retry());
    assert_eq!(store.calls(StoreOperation::MoveStageLabel), 1);
    assert_eq!(store.version_count(&secret()), 2);
    assert_eq!(
        store.versions_with_stage(&secret(), "AWSCURRENT"),
        vec![VersionId::from("v1")]
    );
    assert_eq!(
        store.versions_with_stage(&secret(), "AWSPENDING"),
        vec![VersionId::from("v2")]
    );
}

#[tokio::test]
async fn promotion_retry_completes_degraded_rotation() {
    let store = seeded_store();
    store.fail_next(
        StoreOperation::MoveStageLabel,
        StoreError::Transient("throttled".to_string()),
    );
    let coordinator = coordinator(&store);

    let err = coordinator.rotate(&secret()).await.unwrap_err();
    let pending = err.pending_version().cloned().unwrap();

    coordinator
        .promote(&secret(), &VersionId::from("v1"), &pending)
        .await
        .unwrap();

    assert_eq!(store.versions_with_stage(&secret(), "AWSCURRENT"), vec![pending]);
    assert_eq!(coordinator.generator().calls(), 1);
    assert_eq!(store.calls(StoreOperation::CreateVersion), 1);
}

#[tokio::test]
async fn promote_from_stale_version_conflicts() {
    let store = seeded_store();
    let coordinator = coordinator(&store);
    coordinator.rotate(&secret()).await.unwrap();

    let err = coordinator
        .promote(&secret(), &VersionId::from("v1"), &VersionId::from("v2"))
        .await
        .unwrap_err();

    assert!(matches!(err.store_error(), Some(StoreError::Conflict(_))));
    assert_eq!(err.step(), RotationStep::Promote);
    assert_eq!(
        store.versions_with_stage(&secret(), "AWSCURRENT"),
        vec![VersionId::from("v2")]
    );
}

#[tokio::test]
async fn rerunning_after_failed_promotions_strands_versions() {
    let store = seeded_store();
    let coordinator = coordinator(&store);
    for _ in 0..2 {
        store.fail_next(
            StoreOperation::MoveStageLabel,
            StoreError::Transient("throttled".to_string()),
        );
        assert!(coordinator.rotate(&secret()).await.is_err());
    }

    let inventory = coordinator.tracker().inventory(&secret()).await.unwrap();
    assert_eq!(inventory.active, Some(VersionId::from("v1")));
    assert_eq!(
        inventory.orphaned,
        vec![VersionId::from("v2"), VersionId::from("v3")]
    );
}

#[tokio::test]
async fn custom_stage_labels_are_honoured() {
    let stages = keyturn_vault::StageLabels {
        active: "active".to_string(),
        pending: "staged".to_string(),
        previous: "retired".to_string(),
    };
    let store = Arc::new(
        InMemorySecretStore::with_stages(stages.clone()).with_secret(SECRET, "k1", "AAA"),
    );
    let config = RotationConfig {
        stages,
        ..Default::default()
    };
    let coordinator = RotationCoordinator::new(Arc::clone(&store), &config);

    coordinator.rotate(&secret()).await.unwrap();

    assert_eq!(store.versions_with_stage(&secret(), "active").len(), 1);
    assert_eq!(
        store.versions_with_stage(&secret(), "retired"),
        vec![VersionId::from("k1")]
    );
    assert!(store.versions_with_stage(&secret(), "AWSCURRENT").is_empty());
}
