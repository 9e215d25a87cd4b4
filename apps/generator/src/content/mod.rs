//! Content Loader: reads the YAML trees the generator renders from.
//!
//! `resume.yaml` is required. `site.config.yaml` and `pdf.config.yaml` are
//! optional and fall back to defaults when absent.

pub mod site;
pub mod validation;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::errors::ContentError;
use crate::models::document::{DocumentConfig, RawDocumentConfig};
use crate::models::resume::ResumeRoot;
use site::SiteConfig;
use validation::{validate_resume, ValidationIssue};

/// A parsed resume together with any schema issues found in it.
#[derive(Debug, Clone)]
pub struct LoadedResume {
    pub data: ResumeRoot,
    pub issues: Vec<ValidationIssue>,
}

fn read_yaml<T: DeserializeOwned + Default>(path: &Path) -> Result<T, ContentError> {
    let text = fs::read_to_string(path).map_err(|source| ContentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(&text).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads and validates the resume.
///
/// Issues are logged and returned; with `strict` set any issue fails the load.
pub fn load_resume(path: &Path, strict: bool) -> Result<LoadedResume, ContentError> {
    let data: ResumeRoot = read_yaml(path)?;
    let issues = validate_resume(&data);

    if !issues.is_empty() {
        if strict {
            return Err(ContentError::Validation(issues));
        }
        for issue in &issues {
            warn!("Resume schema issue at {}: {}", issue.path, issue.message);
        }
    }
    debug!("Loaded resume from {} ({} issues)", path.display(), issues.len());

    Ok(LoadedResume { data, issues })
}

/// Loads the site config, or defaults when the file does not exist.
pub fn load_site_config(path: &Path) -> Result<SiteConfig, ContentError> {
    if !path.exists() {
        debug!("No site config at {}; using defaults", path.display());
        return Ok(SiteConfig::default());
    }
    read_yaml(path)
}

/// Loads the document config from the first existing candidate path and
/// resolves it. The site's date format applies when the document config does
/// not set one.
pub fn load_document_config(
    candidates: &[PathBuf],
    site: &SiteConfig,
) -> Result<DocumentConfig, ContentError> {
    let mut raw: RawDocumentConfig = match candidates.iter().find(|p| p.exists()) {
        Some(path) => {
            info!("Using document config {}", path.display());
            read_yaml(path)?
        }
        None => {
            debug!("No document config found; using defaults");
            RawDocumentConfig::default()
        }
    };
    if raw.date_format.is_none() {
        raw.date_format = site.document_date_format();
    }
    Ok(DocumentConfig::resolve(raw))
}
