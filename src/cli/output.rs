//! CLI output formatting

use crate::core::{Attribute, Diagnostic, Presence, SchemaDescriptor};
use crate::snapshot::Snapshot;
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");

/// Format a diagnostic as title plus indented detail
pub fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    format!(
        "{}{}\n  {}",
        CROSS,
        style(&diagnostic.summary).red().bold(),
        style(&diagnostic.detail).dim()
    )
}

/// Format a presence policy for display
pub fn format_presence(presence: Presence) -> String {
    match presence {
        Presence::Required => style("required").red().to_string(),
        Presence::Optional => style("optional").dim().to_string(),
        Presence::Computed => style("computed").cyan().to_string(),
    }
}

/// One line of the schema listing
pub fn format_attribute(path: &str, attribute: &Attribute) -> String {
    let depth = path.matches('.').count();
    let mut line = format!(
        "{}{} {} {}",
        "  ".repeat(depth + 1),
        style(&attribute.name).bold(),
        style(attribute.ty.to_string()).cyan(),
        format_presence(attribute.presence)
    );
    if let Some(description) = &attribute.description {
        line.push_str(&format!(" - {}", style(description).dim()));
    }
    line
}

/// Header line for a schema descriptor
pub fn format_schema_header(schema: &SchemaDescriptor) -> String {
    format!(
        "{} {} (version {}, {} attributes)",
        INFO,
        style(schema.name()).bold(),
        style(schema.version()).cyan(),
        schema.paths().len()
    )
}

/// Summary of an accepted snapshot
pub fn format_snapshot_summary(snapshot: &Snapshot) -> String {
    format!(
        "{} {} → {} v{} ({} nodes)",
        CHECK,
        style(snapshot.file_location()).bold(),
        style(snapshot.schema_name()).cyan(),
        snapshot.schema_version(),
        snapshot.attributes().node_count()
    )
}
