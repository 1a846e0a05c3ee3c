//! Test: snapshots handed to the host

use crate::helpers::*;
use ci_snapshot::core::{Diagnostic, SchemaDescriptor, SchemaVersion, SnapshotError};
use ci_snapshot::snapshot::{FileDataSource, InMemoryState, JsonStateWriter};
use std::sync::Arc;

/// The host receives the snapshot exactly as converted
#[tokio::test]
async fn test_snapshot_forwarded_verbatim() {
    let file = write_document("stages: [build]\ndefault:\n  tags: [linux]\n");
    let host = Arc::new(RecordingHost::accepting());
    let source = FileDataSource::new(host.clone());

    let expected = FileDataSource::snapshot(&request(&file, SchemaVersion::Full)).unwrap();
    let returned = source.read(&request(&file, SchemaVersion::Full)).await.unwrap();

    let accepted = host.accepted();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0], returned);
    assert_eq!(accepted[0].attributes(), expected.attributes());
}

/// A host rejection surfaces verbatim
#[tokio::test]
async fn test_host_rejection() {
    let file = write_document("stages: [build]\n");
    let host = Arc::new(RecordingHost::rejecting("unsupported schema gitlabci_file v4"));
    let source = FileDataSource::new(host.clone());

    let err = source.read(&request(&file, SchemaVersion::Full)).await.unwrap_err();

    assert!(matches!(err, SnapshotError::StateRejected(_)));
    let diagnostic = Diagnostic::from(&err);
    assert_eq!(diagnostic.summary, "State rejected by host");
    assert_eq!(diagnostic.detail, "unsupported schema gitlabci_file v4");
    assert_eq!(host.calls(), 1);
}

/// The in-memory host rejects a snapshot of a different schema version
#[tokio::test]
async fn test_version_mismatch_rejected() {
    let file = write_document("stages: [build]\n");
    let host = Arc::new(InMemoryState::new(SchemaDescriptor::builtin(SchemaVersion::Full)));
    let source = FileDataSource::new(host.clone());

    let err = source
        .read(&request(&file, SchemaVersion::StagesOnly))
        .await
        .unwrap_err();
    assert!(matches!(err, SnapshotError::StateRejected(_)));
    assert!(host.is_empty().await);

    source.read(&request(&file, SchemaVersion::Full)).await.unwrap();
    assert_eq!(host.len().await, 1);
}

/// The JSON writer produces a document the host can load back
#[tokio::test]
async fn test_json_state_file() {
    let file = write_document("stages: [build, test]\n");
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    let writer = Arc::new(JsonStateWriter::to_file(&state_path).unwrap());
    FileDataSource::new(writer)
        .read(&request(&file, SchemaVersion::DefaultCache))
        .await
        .unwrap();

    let state: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&state_path).unwrap()).unwrap();
    assert_eq!(state["schema_version"], 3);
    assert_eq!(state["attributes"]["stages"], serde_json::json!(["build", "test"]));
    assert_eq!(state["attributes"]["default"]["cache"]["paths"], serde_json::json!([]));
    assert_eq!(state["attributes"]["default"]["image"], "");
}

/// A read that fails leaves the previous state file as it was
#[tokio::test]
async fn test_failed_read_keeps_previous_state() {
    let file = write_document("stages: [build\n");
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    std::fs::write(&state_path, "{\"previous\":\"state\"}").unwrap();

    let writer = Arc::new(JsonStateWriter::to_file(&state_path).unwrap());
    let err = FileDataSource::new(writer)
        .read(&request(&file, SchemaVersion::Full))
        .await
        .unwrap_err();

    assert!(matches!(err, SnapshotError::Parse(_)));
    assert_eq!(std::fs::read_to_string(&state_path).unwrap(), "{\"previous\":\"state\"}");
}
