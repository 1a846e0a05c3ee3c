//! Test: one document under each built-in schema version

use crate::helpers::*;
use ci_snapshot::core::{SchemaVersion, TypedValue};
use ci_snapshot::snapshot::FileDataSource;

const DOCUMENT: &str = r#"
stages: [lint, build]
default:
  image: node:20
  tags: [shared]
  cache:
    key: npm
    paths: [node_modules/]
  artifacts:
    paths: [dist/]
"#;

#[test]
fn test_stages_only() {
    let file = write_document(DOCUMENT);
    let snapshot = FileDataSource::snapshot(&request(&file, SchemaVersion::StagesOnly)).unwrap();
    let tree = snapshot.attributes();

    assert_eq!(tree.len(), 1);
    assert_eq!(strings(tree, "stages"), vec!["lint", "build"]);
    assert_eq!(snapshot.schema_version(), 1);
}

#[test]
fn test_default_scalars() {
    let file = write_document(DOCUMENT);
    let snapshot = FileDataSource::snapshot(&request(&file, SchemaVersion::DefaultScalars)).unwrap();
    let tree = snapshot.attributes();

    assert_eq!(string(tree, "default.image"), "node:20");
    assert_eq!(strings(tree, "default.tags"), vec!["shared"]);
    assert!(tree.at("default.cache").is_none());
}

#[test]
fn test_default_cache() {
    let file = write_document(DOCUMENT);
    let snapshot = FileDataSource::snapshot(&request(&file, SchemaVersion::DefaultCache)).unwrap();
    let tree = snapshot.attributes();

    assert_eq!(string(tree, "default.cache.key"), "npm");
    assert!(tree.at("default.artifacts").is_none());
    assert!(tree.at("default.services").is_none());
}

#[test]
fn test_full() {
    let file = write_document(DOCUMENT);
    let snapshot = FileDataSource::snapshot(&request(&file, SchemaVersion::Full)).unwrap();
    let tree = snapshot.attributes();

    assert_eq!(strings(tree, "default.artifacts.paths"), vec!["dist/"]);
    assert!(strings(tree, "default.artifacts.exclude").is_empty());
    assert_eq!(
        tree.at("default.services").and_then(TypedValue::as_object_list).map(|s| s.len()),
        Some(0)
    );
}
