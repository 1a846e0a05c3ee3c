//! Test utility functions for ci-snapshot

use ci_snapshot::core::{ReadRequest, SchemaSource, SchemaVersion, StateRejectedError, TypedTree, TypedValue};
use ci_snapshot::snapshot::{Snapshot, StateAcceptor};

use async_trait::async_trait;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Write a pipeline document to a temp file
pub fn write_document(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(yaml.as_bytes()).expect("write document");
    file
}

/// Request for a temp document with a built-in schema
pub fn request(file: &NamedTempFile, version: SchemaVersion) -> ReadRequest {
    ReadRequest::new(file.path()).with_schema(SchemaSource::Builtin(version))
}

/// String elements of a `list(string)` node
pub fn strings(tree: &TypedTree, path: &str) -> Vec<String> {
    tree.at(path)
        .and_then(TypedValue::as_string_list)
        .unwrap_or_else(|| panic!("{} is not a list(string)", path))
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn string(tree: &TypedTree, path: &str) -> String {
    tree.at(path)
        .and_then(TypedValue::as_str)
        .unwrap_or_else(|| panic!("{} is not a string", path))
        .to_string()
}

/// Host double that records every snapshot it is offered
pub struct RecordingHost {
    accepted: Mutex<Vec<Snapshot>>,
    reject_with: Option<String>,
    calls: AtomicUsize,
}

impl RecordingHost {
    pub fn accepting() -> Self {
        Self {
            accepted: Mutex::new(Vec::new()),
            reject_with: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            reject_with: Some(reason.to_string()),
            ..Self::accepting()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn accepted(&self) -> Vec<Snapshot> {
        self.accepted.lock().unwrap().clone()
    }
}

#[async_trait]
impl StateAcceptor for RecordingHost {
    async fn accept_state(&self, snapshot: &Snapshot) -> Result<(), StateRejectedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.reject_with {
            return Err(StateRejectedError::new(reason.clone()));
        }
        self.accepted.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}
