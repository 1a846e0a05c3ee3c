//! File data source: read, parse, convert, hand to the host

use crate::conversion::TreeConverter;
use crate::core::config::ReadRequest;
use crate::core::document::PipelineDocument;
use crate::core::error::SnapshotError;
use crate::snapshot::{Snapshot, StateAcceptor};
use std::sync::Arc;
use tracing::{debug, info};

/// Forwards finished snapshots to the host unchanged
#[derive(Clone)]
pub struct SnapshotEmitter {
    acceptor: Arc<dyn StateAcceptor>,
}

impl SnapshotEmitter {
    pub fn new(acceptor: Arc<dyn StateAcceptor>) -> Self {
        Self { acceptor }
    }

    /// Hand a snapshot to the host; a refusal is returned as-is
    pub async fn emit(&self, snapshot: Snapshot) -> Result<Snapshot, SnapshotError> {
        self.acceptor.accept_state(&snapshot).await?;
        Ok(snapshot)
    }
}

/// The `<provider>_file` data source
#[derive(Clone)]
pub struct FileDataSource {
    emitter: SnapshotEmitter,
}

impl FileDataSource {
    pub fn new(acceptor: Arc<dyn StateAcceptor>) -> Self {
        Self {
            emitter: SnapshotEmitter::new(acceptor),
        }
    }

    /// Data source type name under a provider
    pub fn type_name(provider_type_name: &str) -> String {
        format!("{}_file", provider_type_name)
    }

    /// Read and convert a document without contacting the host
    ///
    /// Each call reads the whole file and builds a fresh document model and
    /// tree; nothing is shared between calls besides read-only descriptors.
    pub fn snapshot(request: &ReadRequest) -> Result<Snapshot, SnapshotError> {
        let schema = request.schema.load()?;
        let document = PipelineDocument::from_file(&request.file_location)?;
        let attributes = TreeConverter::new(&schema).convert(&document)?;
        debug!(
            file = %request.file_location.display(),
            nodes = attributes.node_count(),
            "converted pipeline document"
        );
        Ok(Snapshot::new(
            &schema,
            request.file_location.to_string_lossy(),
            attributes,
        ))
    }

    /// Full read: convert, then hand the snapshot to the host
    pub async fn read(&self, request: &ReadRequest) -> Result<Snapshot, SnapshotError> {
        let snapshot = Self::snapshot(request)?;
        let snapshot = self.emitter.emit(snapshot).await?;
        info!(
            file = snapshot.file_location(),
            schema = snapshot.schema_name(),
            version = snapshot.schema_version(),
            "state accepted"
        );
        Ok(snapshot)
    }
}
