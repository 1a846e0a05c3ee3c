//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{ReadCommand, SchemaCommand, ValidateCommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Typed snapshots of CI pipeline definitions
#[derive(Debug, Parser, Clone)]
#[command(name = "ci-snapshot")]
#[command(author = "ci-snapshot contributors")]
#[command(version = "0.1.0")]
#[command(about = "Projects a CI pipeline definition into a typed, schema-validated snapshot", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a YAML file with default read settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Read a document and hand its snapshot to the state writer
    Read(ReadCommand),

    /// Check that a document converts cleanly
    Validate(ValidateCommand),

    /// Show the attributes of a schema descriptor
    Schema(SchemaCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
