//! Snapshots and the host's state-acceptance boundary

pub mod source;
pub mod writer;

pub use source::{FileDataSource, SnapshotEmitter};
pub use writer::JsonStateWriter;

use crate::core::error::StateRejectedError;
use crate::core::schema::SchemaDescriptor;
use crate::core::tree::TypedTree;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// A converted document, ready for the host
///
/// Read-only once built; the timestamp sits outside the attribute tree so
/// two reads of the same bytes yield identical trees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    schema_name: String,
    schema_version: u32,
    file_location: String,
    read_at: DateTime<Utc>,
    attributes: TypedTree,
}

impl Snapshot {
    pub fn new(schema: &SchemaDescriptor, file_location: impl Into<String>, attributes: TypedTree) -> Self {
        Self {
            schema_name: schema.name().to_string(),
            schema_version: schema.version(),
            file_location: file_location.into(),
            read_at: Utc::now(),
            attributes,
        }
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn file_location(&self) -> &str {
        &self.file_location
    }

    pub fn read_at(&self) -> DateTime<Utc> {
        self.read_at
    }

    pub fn attributes(&self) -> &TypedTree {
        &self.attributes
    }
}

/// The host's state-acceptance interface
#[async_trait]
pub trait StateAcceptor: Send + Sync {
    /// Take ownership of a snapshot's state, or refuse it
    async fn accept_state(&self, snapshot: &Snapshot) -> Result<(), StateRejectedError>;
}

/// In-memory host state (for testing or ephemeral use)
///
/// Accepts only snapshots of the schema name and version it was created
/// for, keeping the latest one per file location.
pub struct InMemoryState {
    schema_name: String,
    schema_version: u32,
    states: tokio::sync::RwLock<HashMap<String, Snapshot>>,
}

impl InMemoryState {
    pub fn new(schema: &SchemaDescriptor) -> Self {
        Self {
            schema_name: schema.name().to_string(),
            schema_version: schema.version(),
            states: tokio::sync::RwLock::new(HashMap::new()),
        }
    }

    /// Latest accepted snapshot for a file location
    pub async fn latest(&self, file_location: &str) -> Option<Snapshot> {
        self.states.read().await.get(file_location).cloned()
    }

    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

#[async_trait]
impl StateAcceptor for InMemoryState {
    async fn accept_state(&self, snapshot: &Snapshot) -> Result<(), StateRejectedError> {
        if snapshot.schema_name() != self.schema_name {
            return Err(StateRejectedError::new(format!(
                "schema '{}' does not match expected '{}'",
                snapshot.schema_name(),
                self.schema_name
            )));
        }
        if snapshot.schema_version() != self.schema_version {
            return Err(StateRejectedError::new(format!(
                "schema version {} does not match expected {}",
                snapshot.schema_version(),
                self.schema_version
            )));
        }

        let mut states = self.states.write().await;
        states.insert(snapshot.file_location().to_string(), snapshot.clone());
        Ok(())
    }
}
