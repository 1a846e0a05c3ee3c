//! Core domain models
//!
//! This module defines the pipeline document, the schema descriptors that
//! declare snapshot shapes, the typed tree a conversion produces, and the
//! errors surfaced to the host.

pub mod config;
pub mod document;
pub mod error;
pub mod schema;
pub mod tree;

pub use config::{ReadRequest, SchemaSource, SnapshotConfig};
pub use document::*;
pub use error::*;
pub use schema::*;
pub use tree::*;
