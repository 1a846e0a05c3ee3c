//! Read configuration: which document to read and which schema to apply

use crate::core::error::SnapshotError;
use crate::core::schema::{SchemaDescriptor, SchemaVersion};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Where a read gets its schema descriptor from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    Builtin(SchemaVersion),
    /// Descriptor YAML on disk
    File(PathBuf),
}

impl Default for SchemaSource {
    fn default() -> Self {
        SchemaSource::Builtin(SchemaVersion::default())
    }
}

impl SchemaSource {
    /// Resolve to a descriptor; built-ins are borrowed, files are loaded
    pub fn load(&self) -> Result<Cow<'static, SchemaDescriptor>, SnapshotError> {
        match self {
            SchemaSource::Builtin(version) => Ok(Cow::Borrowed(SchemaDescriptor::builtin(*version))),
            SchemaSource::File(path) => SchemaDescriptor::from_file(path).map(Cow::Owned),
        }
    }
}

/// A single read of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    pub file_location: PathBuf,
    pub schema: SchemaSource,
}

impl ReadRequest {
    pub fn new(file_location: impl Into<PathBuf>) -> Self {
        Self {
            file_location: file_location.into(),
            schema: SchemaSource::default(),
        }
    }

    pub fn with_schema(mut self, schema: SchemaSource) -> Self {
        self.schema = schema;
        self
    }
}

/// Defaults loaded from a YAML config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Document to read when none is given on the command line
    #[serde(default)]
    pub file_location: Option<PathBuf>,

    /// Built-in schema version
    #[serde(default)]
    pub schema: SchemaVersion,

    /// Custom descriptor; wins over `schema`
    #[serde(default)]
    pub schema_file: Option<PathBuf>,
}

impl SnapshotConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Option<SnapshotConfig> = serde_yaml::from_str(yaml)?;
        let config = config.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.file_location {
            if path.as_os_str().is_empty() {
                anyhow::bail!("file_location must not be empty");
            }
        }
        if let Some(path) = &self.schema_file {
            if !path.exists() {
                anyhow::bail!("schema_file references file that doesn't exist: {}", path.display());
            }
        }
        Ok(())
    }

    pub fn schema_source(&self) -> SchemaSource {
        match &self.schema_file {
            Some(path) => SchemaSource::File(path.clone()),
            None => SchemaSource::Builtin(self.schema),
        }
    }

    /// Build a request, with explicit values taking precedence over the config
    pub fn to_request(
        &self,
        file_location: Option<PathBuf>,
        schema: Option<SchemaSource>,
    ) -> Result<ReadRequest> {
        let file_location = file_location
            .or_else(|| self.file_location.clone())
            .ok_or_else(|| anyhow::anyhow!("no file_location given and none configured"))?;
        Ok(ReadRequest {
            file_location,
            schema: schema.unwrap_or_else(|| self.schema_source()),
        })
    }
}
