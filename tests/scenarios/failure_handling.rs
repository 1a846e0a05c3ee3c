//! Test: failure handling - every failure aborts before the host sees anything

use crate::helpers::*;
use ci_snapshot::core::{Diagnostic, ReadRequest, SchemaSource, SchemaVersion, SnapshotError};
use ci_snapshot::snapshot::FileDataSource;
use std::io::Write;
use std::sync::Arc;

/// Malformed YAML is a parse error and nothing is emitted
#[tokio::test]
async fn test_malformed_yaml() {
    let file = write_document("stages: [build, test\ndefault:\n  image: x\n");
    let host = Arc::new(RecordingHost::accepting());
    let source = FileDataSource::new(host.clone());

    let err = source.read(&request(&file, SchemaVersion::Full)).await.unwrap_err();

    assert!(matches!(err, SnapshotError::Parse(_)), "got {:?}", err);
    assert_eq!(Diagnostic::from(&err).summary, "Could not parse the file");
    assert_eq!(host.calls(), 0);
}

/// A missing file is an I/O error
#[tokio::test]
async fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join(".gitlab-ci.yml");
    let host = Arc::new(RecordingHost::accepting());
    let source = FileDataSource::new(host.clone());

    let err = source.read(&ReadRequest::new(&missing)).await.unwrap_err();

    match &err {
        SnapshotError::Io { path, source } => {
            assert_eq!(path, &missing);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("Expected Io error, got {:?}", other),
    }
    assert_eq!(Diagnostic::from(&err).summary, "Could not read the file");
    assert_eq!(host.calls(), 0);
}

/// A required attribute that the document omits names its exact path
#[tokio::test]
async fn test_missing_required_attribute() {
    let mut descriptor = tempfile::NamedTempFile::new().unwrap();
    write!(
        descriptor,
        r#"
name: gitlabci_file
version: 10
attributes:
  stages: {{ type: list(string), presence: required }}
  default:
    type: object
    attributes:
      image: {{ type: string }}
"#
    )
    .unwrap();

    let file = write_document("default:\n  image: alpine\n");
    let host = Arc::new(RecordingHost::accepting());
    let source = FileDataSource::new(host.clone());

    let request = ReadRequest::new(file.path())
        .with_schema(SchemaSource::File(descriptor.path().to_path_buf()));
    let err = source.read(&request).await.unwrap_err();

    let diagnostic = Diagnostic::from(&err);
    assert_eq!(diagnostic.summary, "Missing required attribute");
    assert!(diagnostic.detail.contains("'stages'"));
    assert_eq!(host.calls(), 0);
}

/// A broken descriptor file is reported as such
#[test]
fn test_invalid_descriptor() {
    let descriptor = write_document("name: x\nversion: 1\nattributes:\n  a: { type: decimal }\n");
    let file = write_document("stages: [build]\n");

    let request = ReadRequest::new(file.path())
        .with_schema(SchemaSource::File(descriptor.path().to_path_buf()));
    let err = FileDataSource::snapshot(&request).unwrap_err();

    assert_eq!(Diagnostic::from(&err).summary, "Invalid schema descriptor");
}
