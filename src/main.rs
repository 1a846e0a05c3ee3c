use ci_snapshot::cli::commands::{ReadCommand, SchemaArgs, SchemaCommand, ValidateCommand};
use ci_snapshot::cli::output::*;
use ci_snapshot::cli::{Cli, Command};
use ci_snapshot::core::{Diagnostic, ReadRequest, SnapshotConfig, SnapshotError};
use ci_snapshot::snapshot::{FileDataSource, JsonStateWriter, StateAcceptor};

use anyhow::{Context, Result};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Logs go to stderr so a snapshot on stdout stays clean JSON
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let config = match &cli.config {
        Some(path) => SnapshotConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SnapshotConfig::default(),
    };

    match &cli.command {
        Command::Read(cmd) => read_document(cmd, &config).await?,
        Command::Validate(cmd) => validate_document(cmd, &config)?,
        Command::Schema(cmd) => describe_schema(cmd, &config)?,
    }

    Ok(())
}

fn build_request(config: &SnapshotConfig, file: &Option<PathBuf>, schema: &SchemaArgs) -> Result<ReadRequest> {
    config.to_request(file.clone(), schema.source())
}

/// Print the diagnostic for a failed read and exit non-zero
fn fail(err: &SnapshotError) -> ! {
    eprintln!("{}", format_diagnostic(&Diagnostic::from(err)));
    std::process::exit(1);
}

async fn read_document(cmd: &ReadCommand, config: &SnapshotConfig) -> Result<()> {
    let request = build_request(config, &cmd.file, &cmd.schema)?;

    let acceptor: Arc<dyn StateAcceptor> = match &cmd.output {
        Some(path) => Arc::new(JsonStateWriter::to_file(path)?),
        None => Arc::new(JsonStateWriter::stdout()),
    };
    let source = FileDataSource::new(acceptor);

    match source.read(&request).await {
        Ok(snapshot) => {
            if cmd.output.is_some() {
                println!("{}", format_snapshot_summary(&snapshot));
            }
            Ok(())
        }
        Err(e) => fail(&e),
    }
}

fn validate_document(cmd: &ValidateCommand, config: &SnapshotConfig) -> Result<()> {
    let request = build_request(config, &cmd.file, &cmd.schema)?;
    println!("{} Validating {}...", INFO, style(request.file_location.display()).bold());

    match FileDataSource::snapshot(&request) {
        Ok(snapshot) => {
            let stages = snapshot
                .attributes()
                .get("stages")
                .and_then(|v| v.as_list())
                .map_or(0, |items| items.len());

            println!("{} Document converts cleanly!", CHECK);
            println!(
                "  Schema: {} v{}",
                style(snapshot.schema_name()).bold(),
                snapshot.schema_version()
            );
            println!("  Stages: {}", style(stages).cyan());
            println!("  Attributes: {}", style(snapshot.attributes().node_count()).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(snapshot.attributes())?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => fail(&e),
    }
}

fn describe_schema(cmd: &SchemaCommand, config: &SnapshotConfig) -> Result<()> {
    let source = cmd.schema.source().unwrap_or_else(|| config.schema_source());
    let schema = match source.load() {
        Ok(schema) => schema,
        Err(e) => fail(&e),
    };

    if cmd.json {
        let attributes: Vec<_> = schema
            .paths()
            .into_iter()
            .map(|(path, attribute)| {
                json!({
                    "path": path,
                    "type": attribute.ty.to_string(),
                    "presence": attribute.presence,
                    "description": attribute.description,
                })
            })
            .collect();
        let data = json!({
            "name": schema.name(),
            "version": schema.version(),
            "attributes": attributes,
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{}", format_schema_header(&schema));
    for (path, attribute) in schema.paths() {
        println!("{}", format_attribute(&path, attribute));
    }

    Ok(())
}
