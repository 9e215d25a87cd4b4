use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::GeneratorError;

const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 120;

/// Runtime configuration loaded from environment variables (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub paths: ProjectPaths,
    /// Upper bound for any single external tool invocation.
    pub tool_timeout: Duration,
    pub rust_log: String,
}

/// Where inputs are read from and outputs are written to, relative to the
/// project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub resume: PathBuf,
    pub site_config: PathBuf,
    /// Checked in order; the first that exists is used.
    pub document_config_candidates: Vec<PathBuf>,
    pub template: PathBuf,
    pub output_dir: PathBuf,
    pub downloads_dir: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let content = root.join("content");
        Self {
            resume: content.join("resume.yaml"),
            site_config: content.join("site.config.yaml"),
            document_config_candidates: vec![
                root.join("pdf.config.yaml"),
                content.join("pdf.config.yaml"),
            ],
            template: root.join("templates").join("resume_template.tex"),
            output_dir: root.join("output"),
            downloads_dir: root.join("public").join("downloads"),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Config {
    pub fn from_env() -> Result<Self, GeneratorError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let root = match std::env::var("RESUME_ROOT") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => std::env::current_dir().map_err(|e| {
                GeneratorError::Config(format!("cannot determine working directory: {e}"))
            })?,
        };

        let tool_timeout = match std::env::var("RESUME_TOOL_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout(&raw)?,
            Err(_) => Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
        };

        Ok(Config {
            paths: ProjectPaths::new(root),
            tool_timeout,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Configuration rooted at `root` with default settings.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Config {
            paths: ProjectPaths::new(root),
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
            rust_log: "info".to_string(),
        }
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, GeneratorError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(GeneratorError::Config(format!(
            "RESUME_TOOL_TIMEOUT_SECS must be a positive number of seconds, got '{raw}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_layout() {
        let paths = ProjectPaths::new("/site");
        assert_eq!(paths.resume, PathBuf::from("/site/content/resume.yaml"));
        assert_eq!(paths.site_config, PathBuf::from("/site/content/site.config.yaml"));
        assert_eq!(
            paths.document_config_candidates,
            vec![
                PathBuf::from("/site/pdf.config.yaml"),
                PathBuf::from("/site/content/pdf.config.yaml")
            ]
        );
        assert_eq!(paths.template, PathBuf::from("/site/templates/resume_template.tex"));
        assert_eq!(paths.output_dir, PathBuf::from("/site/output"));
        assert_eq!(paths.downloads_dir, PathBuf::from("/site/public/downloads"));
        assert_eq!(paths.root(), Path::new("/site"));
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_timeout(" 5 ").unwrap(), Duration::from_secs(5));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_for_root_defaults() {
        let cfg = Config::for_root("/x");
        assert_eq!(cfg.tool_timeout, Duration::from_secs(120));
        assert_eq!(cfg.paths.output_dir, PathBuf::from("/x/output"));
    }
}
