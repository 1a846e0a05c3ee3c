//! Pipeline definition document parsed from YAML
//!
//! The structs here mirror the document one-to-one. Nothing is validated:
//! every field is optional, unknown keys (job definitions, `variables`,
//! `workflow`, ...) are ignored, and a field left out of the document stays
//! `None` so the converter can tell an omitted field from an empty one.

use crate::core::error::SnapshotError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Top-level pipeline definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineDocument {
    /// Stage names in declaration order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<String>>,

    /// Settings inherited by every job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultSection>,
}

/// The `default:` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interruptible: Option<bool>,

    /// Runner tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_script: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_script: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheSection>,

    /// Service containers, either `- image:tag` or the full mapping form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<ServiceEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<ArtifactsSection>,
}

/// The `cache:` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
}

/// One entry of `services:`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
}

/// A service entry as written in the document
///
/// Always serializes in the mapping form so downstream consumers only ever
/// see [`ServiceSection`] fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ServiceEntry {
    /// Shorthand: just the image name
    Image(String),
    /// Full mapping form
    Section(ServiceSection),
}

impl ServiceEntry {
    /// View the entry in its mapping form
    pub fn to_section(&self) -> ServiceSection {
        match self {
            ServiceEntry::Image(name) => ServiceSection {
                name: Some(name.clone()),
                ..ServiceSection::default()
            },
            ServiceEntry::Section(section) => section.clone(),
        }
    }
}

impl Serialize for ServiceEntry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_section().serialize(serializer)
    }
}

/// The `artifacts:` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactsSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// `on_success`, `on_failure` or `always`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub untracked: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose_as: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_in: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
}

impl PipelineDocument {
    /// Read the whole file, then parse it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "read pipeline document");
        Self::from_yaml(&content)
    }

    /// Parse a document from YAML text
    ///
    /// Merge keys (`<<: *anchor`) are expanded before the model is built.
    /// An empty (or comment-only) document parses to the all-absent model.
    pub fn from_yaml(yaml: &str) -> Result<Self, SnapshotError> {
        let mut value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        value.apply_merge()?;
        let document: Option<PipelineDocument> = serde_yaml::from_value(value)?;
        Ok(document.unwrap_or_default())
    }

    /// Stage names, empty when the document declares none
    pub fn stage_names(&self) -> &[String] {
        self.stages.as_deref().unwrap_or(&[])
    }

    /// The document as a YAML value tree, omitting every absent field
    pub fn to_value(&self) -> Result<serde_yaml::Value, SnapshotError> {
        Ok(serde_yaml::to_value(self)?)
    }
}
