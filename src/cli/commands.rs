//! CLI command definitions

use crate::core::{SchemaSource, SchemaVersion};
use clap::Args;
use std::path::PathBuf;

/// Schema selection shared by every command
#[derive(Debug, Args, Clone, Default)]
pub struct SchemaArgs {
    /// Built-in schema version
    #[arg(long, value_enum, conflicts_with = "schema_file")]
    pub schema: Option<SchemaVersionArg>,

    /// Custom schema descriptor (YAML)
    #[arg(long)]
    pub schema_file: Option<PathBuf>,
}

impl SchemaArgs {
    /// The explicitly chosen schema, if any
    pub fn source(&self) -> Option<SchemaSource> {
        match (&self.schema_file, self.schema) {
            (Some(path), _) => Some(SchemaSource::File(path.clone())),
            (None, Some(version)) => Some(SchemaSource::Builtin(version.into())),
            (None, None) => None,
        }
    }
}

/// Read a document and emit its snapshot
#[derive(Debug, Args, Clone)]
pub struct ReadCommand {
    /// Path to the pipeline YAML file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Write the snapshot here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Validate a document against a schema
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to the pipeline YAML file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Print the converted tree as JSON
    #[arg(long)]
    pub json: bool,
}

/// Describe a schema
#[derive(Debug, Args, Clone)]
pub struct SchemaCommand {
    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Schema version argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SchemaVersionArg {
    StagesOnly,
    DefaultScalars,
    DefaultCache,
    Full,
}

impl From<SchemaVersionArg> for SchemaVersion {
    fn from(arg: SchemaVersionArg) -> Self {
        match arg {
            SchemaVersionArg::StagesOnly => SchemaVersion::StagesOnly,
            SchemaVersionArg::DefaultScalars => SchemaVersion::DefaultScalars,
            SchemaVersionArg::DefaultCache => SchemaVersion::DefaultCache,
            SchemaVersionArg::Full => SchemaVersion::Full,
        }
    }
}
