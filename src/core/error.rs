//! Error types and host-facing diagnostics

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Failure while walking a document against a schema descriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("required attribute '{path}' is missing from the document")]
    Missing { path: String },

    /// The document model and the descriptor disagree on an attribute's shape
    #[error("attribute '{path}' does not match its declared type {expected}")]
    SchemaMismatch { path: String, expected: String },

    #[error("document model could not be represented: {0}")]
    Model(String),
}

impl ConversionError {
    /// Dotted path of the offending attribute
    pub fn path(&self) -> Option<&str> {
        match self {
            ConversionError::Missing { path } | ConversionError::SchemaMismatch { path, .. } => Some(path),
            ConversionError::Model(_) => None,
        }
    }
}

/// The host refused a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct StateRejectedError {
    pub reason: String,
}

impl StateRejectedError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Everything that can abort a read
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("state rejected: {0}")]
    StateRejected(#[from] StateRejectedError),

    #[error("invalid schema descriptor: {0}")]
    Schema(String),
}

/// What the host shows its operator: a short title and a detail line
///
/// Every failed read reports exactly one error diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

impl From<&SnapshotError> for Diagnostic {
    fn from(err: &SnapshotError) -> Self {
        match err {
            SnapshotError::Io { path, source } => Diagnostic::error(
                "Could not read the file",
                format!("{}: {}", path.display(), source),
            ),
            SnapshotError::Parse(e) => Diagnostic::error("Could not parse the file", e.to_string()),
            SnapshotError::Conversion(e @ ConversionError::Missing { .. }) => {
                Diagnostic::error("Missing required attribute", e.to_string())
            }
            SnapshotError::Conversion(e) => {
                Diagnostic::error("Schema does not match document model", e.to_string())
            }
            SnapshotError::StateRejected(e) => {
                Diagnostic::error("State rejected by host", e.reason.clone())
            }
            SnapshotError::Schema(message) => {
                Diagnostic::error("Invalid schema descriptor", message.clone())
            }
        }
    }
}
