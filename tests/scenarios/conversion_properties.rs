//! Test: conversion properties over real documents on disk

use crate::helpers::*;
use ci_snapshot::core::{PipelineDocument, SchemaDescriptor, SchemaVersion, TypedValue};
use ci_snapshot::convert;
use ci_snapshot::snapshot::FileDataSource;

const GITLAB_CI: &str = r#"
stages:
  - build
  - test
  - deploy

variables:
  CARGO_HOME: .cargo

default:
  image: rust:1.80
  timeout: 30m
  retry: 2
  interruptible: true
  tags: [docker]
  before_script:
    - rustc --version
    - cargo --version
  cache:
    key: "$CI_COMMIT_REF_SLUG"
    paths:
      - .cache/
      - vendor/
  services:
    - postgres:15
  artifacts:
    when: on_failure
    expire_in: 1 week
    paths: [target/debug/]

build:
  stage: build
  script: [cargo build]
"#;

/// Stages without a default section: everything under default is zero-valued
#[test]
fn test_stages_only_document() {
    let file = write_document("stages: [build, test]\n");
    let snapshot = FileDataSource::snapshot(&request(&file, SchemaVersion::Full)).unwrap();
    let tree = snapshot.attributes();

    assert_eq!(strings(tree, "stages"), vec!["build", "test"]);
    assert_eq!(string(tree, "default.image"), "");
    assert_eq!(string(tree, "default.cache.key"), "");
    assert!(strings(tree, "default.cache.paths").is_empty());
}

/// Cache paths keep their source order
#[test]
fn test_cache_paths_order() {
    let file = write_document(GITLAB_CI);
    let snapshot = FileDataSource::snapshot(&request(&file, SchemaVersion::Full)).unwrap();
    let tree = snapshot.attributes();

    assert_eq!(strings(tree, "default.cache.paths"), vec![".cache/", "vendor/"]);
    assert_eq!(strings(tree, "stages"), vec!["build", "test", "deploy"]);
    assert_eq!(
        strings(tree, "default.before_script"),
        vec!["rustc --version", "cargo --version"]
    );
    assert_eq!(string(tree, "default.cache.key"), "$CI_COMMIT_REF_SLUG");
    assert_eq!(tree.at("default.retry").and_then(TypedValue::as_i64), Some(2));
    assert_eq!(string(tree, "default.artifacts.when"), "on_failure");
    assert_eq!(tree.at("default.artifacts.public").and_then(TypedValue::as_bool), Some(false));
}

/// Defaults shared through a YAML anchor reach the tree
#[test]
fn test_anchored_defaults_are_merged() {
    let file = write_document(
        r#"
.rust: &rust
  image: rust:1.80
  cache:
    key: cargo
    paths: [target/]
stages: [build]
default:
  <<: *rust
  tags: [docker]
"#,
    );
    let snapshot = FileDataSource::snapshot(&request(&file, SchemaVersion::Full)).unwrap();
    let tree = snapshot.attributes();

    assert_eq!(string(tree, "default.image"), "rust:1.80");
    assert_eq!(string(tree, "default.cache.key"), "cargo");
    assert_eq!(strings(tree, "default.cache.paths"), vec!["target/"]);
    assert_eq!(strings(tree, "default.tags"), vec!["docker"]);
}

/// Two reads of the same bytes produce the same tree
#[test]
fn test_reads_are_idempotent() {
    let file = write_document(GITLAB_CI);
    let first = FileDataSource::snapshot(&request(&file, SchemaVersion::Full)).unwrap();
    let second = FileDataSource::snapshot(&request(&file, SchemaVersion::Full)).unwrap();

    assert_eq!(first.attributes(), second.attributes());
}

/// Every optional scalar left out comes back as its zero value, never null
#[test]
fn test_optional_scalars_default_to_zero() {
    let document = PipelineDocument::from_yaml("default: {}\n").unwrap();
    let schema = SchemaDescriptor::builtin(SchemaVersion::Full);
    let tree = convert(&document, schema).unwrap();

    for (path, attribute) in schema.paths() {
        if path.starts_with("default.services.") || path == "stages" {
            continue;
        }
        let node = tree.at(&path).unwrap_or_else(|| panic!("{} missing", path));
        assert!(!node.is_null(), "{} ({}) should not be null", path, attribute.ty);
    }
}

/// Concurrent conversions share only the read-only descriptor
#[test]
fn test_concurrent_conversions_are_independent() {
    let schema = SchemaDescriptor::builtin(SchemaVersion::Full);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let yaml = format!("stages: [stage-{}]\ndefault:\n  retry: {}\n", i, i);
                let document = PipelineDocument::from_yaml(&yaml).unwrap();
                (i, convert(&document, schema).unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (i, tree) = handle.join().unwrap();
        assert_eq!(strings(&tree, "stages"), vec![format!("stage-{}", i)]);
        assert_eq!(tree.at("default.retry").and_then(TypedValue::as_i64), Some(i));
    }
}
