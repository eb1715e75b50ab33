use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced to the user as banners.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A required file is absent and nothing was uploaded.
    #[error("File not found: {}", path.display())]
    MissingSource { path: PathBuf },

    /// A loaded table lacks a column a downstream step needs.
    #[error("Required columns {} missing in {file}", format_columns(columns))]
    MissingColumn { columns: Vec<String>, file: String },

    /// Malformed tabular input. Fatal for the current run.
    #[error("Failed to parse {label}: {source:#}")]
    Parse {
        label: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

/// Render a column list the way the banners show it: `['Timepoint','Twin']`.
fn format_columns(columns: &[String]) -> String {
    let quoted: Vec<String> = columns.iter().map(|c| format!("'{c}'")).collect();
    format!("[{}]", quoted.join(","))
}
