//! ci-snapshot - typed, schema-validated snapshots of CI pipeline definitions

pub mod cli;
pub mod conversion;
pub mod core;
pub mod snapshot;

// Re-export commonly used types
pub use crate::conversion::{convert, TreeConverter};
pub use crate::core::{ConversionError, Diagnostic, PipelineDocument, SnapshotError, StateRejectedError};
pub use crate::core::{ReadRequest, SchemaDescriptor, SchemaSource, SchemaVersion, TypedTree, TypedValue};
pub use crate::snapshot::{FileDataSource, InMemoryState, JsonStateWriter, Snapshot, SnapshotEmitter, StateAcceptor};
