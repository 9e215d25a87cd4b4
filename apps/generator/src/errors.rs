use std::path::PathBuf;

use thiserror::Error;

use crate::content::validation::ValidationIssue;

/// Failures while reading the content and configuration trees.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("JSON Resume validation failed:\n{}", format_issues(.0))]
    Validation(Vec<ValidationIssue>),
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("- {}: {}", i.path, i.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Top-level error for a generation run.
///
/// Only conditions that leave nothing to render are errors; everything
/// downstream of template rendering is reported through the pipeline report.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Failed to read template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}
