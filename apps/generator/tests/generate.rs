//! End-to-end runs over the sample project with scripted tools.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use resume_generator::config::Config;
use resume_generator::pipeline::mock::MockProcessRunner;
use resume_generator::pipeline::orchestrator::{Generator, RunStatus, Step, StepStatus};
use tempfile::TempDir;

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Copies the sample content, template and document config into a scratch root.
fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = repo_root();
    for rel in [
        "content/resume.yaml",
        "content/site.config.yaml",
        "templates/resume_template.tex",
        "pdf.config.yaml",
    ] {
        let target = dir.path().join(rel);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::copy(root.join(rel), &target).unwrap();
    }
    dir
}

#[tokio::test]
async fn test_sample_project_renders_full_document() {
    let dir = sample_project();
    let mock = MockProcessRunner::new();
    let report = Generator::new(Config::for_root(dir.path()), Arc::new(mock))
        .run()
        .await
        .unwrap();

    let tex = fs::read_to_string(dir.path().join("output/resume.tex")).unwrap();
    assert!(tex.starts_with("\\documentclass"));
    assert!(tex.ends_with("\\end{document}"));
    assert!(!tex.contains("{{"));
    assert!(tex.contains("Ada Lovelace"));
    assert!(tex.contains("Babbage \\& Co"));
    assert!(tex.contains("top=0.6in,bottom=0.7in"));
    assert!(tex.contains("\\IfFontExistsTF{Inter}{\\setmainfont{Inter}}"));
    assert!(tex.contains("\\titleformat{\\section}"));

    let at = |needle: &str| tex.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
    assert!(at("\\section*{Experience}") < at("\\section*{Projects}"));
    assert!(at("\\section*{Projects}") < at("\\section*{Education}"));
    assert!(at("\\section*{Education}") < at("\\section*{Skills}"));
    // Certificates render under education rather than as their own section.
    assert!(!tex.contains("\\section*{Certifications}"));
    assert!(tex.contains("Certified Kubernetes Administrator"));

    assert!(report.issues.is_empty());
    assert_eq!(report.status(), RunStatus::Degraded);
}

#[tokio::test]
async fn test_sample_project_compiles_and_publishes() {
    let dir = sample_project();
    let out = dir.path().join("output");
    fs::create_dir_all(&out).unwrap();
    // Stands in for what the engine would leave next to the source.
    fs::write(out.join("resume.pdf"), "%PDF-1.7").unwrap();

    let mock = MockProcessRunner::new().succeed("pandoc").succeed("xelatex");
    let report = Generator::new(Config::for_root(dir.path()), Arc::new(mock.clone()))
        .run()
        .await
        .unwrap();

    let published = dir.path().join("public/downloads/Ada_Lovelace.pdf");
    assert_eq!(fs::read_to_string(&published).unwrap(), "%PDF-1.7");
    assert_eq!(report.pdf_path.as_deref(), Some(published.as_path()));
    assert_eq!(report.engine.as_deref(), Some("xelatex"));
    assert!(matches!(report.outcome(Step::PdfCompile), Some(StepStatus::Succeeded(_))));
    assert!(report.outcome(Step::PdfFallback).is_none());
    assert_eq!(report.status(), RunStatus::Complete);
    assert_eq!(report.exit_code(), 0);

    // One probe plus two compile passes; pandoc only converts to HTML.
    assert_eq!(mock.calls_to("xelatex").len(), 3);
    assert_eq!(mock.calls_to("pandoc").len(), 1);
}

#[tokio::test]
async fn test_missing_resume_is_fatal() {
    let dir = sample_project();
    fs::remove_file(dir.path().join("content/resume.yaml")).unwrap();
    let mock = MockProcessRunner::new().succeed("pandoc");
    let result = Generator::new(Config::for_root(dir.path()), Arc::new(mock.clone()))
        .run()
        .await;

    assert!(result.is_err());
    assert!(mock.calls().is_empty());
    assert!(!dir.path().join("output").exists());
}
