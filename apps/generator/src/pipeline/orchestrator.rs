//! Build Orchestrator: runs a full generation pass.
//!
//! Flow: load content → render LaTeX → write source → HTML conversion →
//!       engine detection → two-pass compile → publish PDF (pandoc fallback).
//!
//! Only content loading and template reading can abort a run. Every step
//! after the LaTeX source exists degrades to a warning and is recorded in the
//! [`PipelineReport`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::content::validation::ValidationIssue;
use crate::content::{load_document_config, load_resume, load_site_config};
use crate::errors::GeneratorError;
use crate::models::document::DocumentConfig;
use crate::render::context::build_context;
use crate::render::template::render_document;

use super::process::ProcessRunner;
use super::tools::{self, ToolFailure, DEFAULT_PDF_ENGINE};

// ────────────────────────────────────────────────────────────────────────────
// Report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    WriteSource,
    HtmlConversion,
    EngineDetection,
    PdfCompile,
    PdfFallback,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::WriteSource => "write LaTeX source",
            Step::HtmlConversion => "HTML conversion",
            Step::EngineDetection => "engine detection",
            Step::PdfCompile => "PDF compile",
            Step::PdfFallback => "pandoc PDF fallback",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded(String),
    /// The step could not run, usually because a tool is missing.
    Skipped(String),
    Failed(String),
}

impl StepStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, StepStatus::Succeeded(_))
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Succeeded(detail) => write!(f, "succeeded ({detail})"),
            StepStatus::Skipped(reason) => write!(f, "skipped: {reason}"),
            StepStatus::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: Step,
    pub status: StepStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every attempted step succeeded on its primary path.
    Complete,
    /// The run finished, but some artifact is missing or came from a fallback.
    Degraded,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Complete => 0,
            RunStatus::Degraded => 2,
        }
    }
}

/// What a generation run produced and how each step ended.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub steps: Vec<StepOutcome>,
    pub tex_path: Option<PathBuf>,
    pub html_path: Option<PathBuf>,
    pub pdf_path: Option<PathBuf>,
    pub engine: Option<String>,
    pub issues: Vec<ValidationIssue>,
}

impl PipelineReport {
    fn record(&mut self, step: Step, status: StepStatus) {
        self.steps.push(StepOutcome { step, status });
    }

    pub fn outcome(&self, step: Step) -> Option<&StepStatus> {
        self.steps.iter().find(|o| o.step == step).map(|o| &o.status)
    }

    pub fn status(&self) -> RunStatus {
        if self.steps.iter().all(|o| o.status.is_success()) {
            RunStatus::Complete
        } else {
            RunStatus::Degraded
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.status().exit_code()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Rendered LaTeX plus the settings that decide where it gets published.
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    pub latex: String,
    pub document: DocumentConfig,
    pub pdf_file_name: String,
    pub issues: Vec<ValidationIssue>,
}

pub struct Generator {
    config: Config,
    runner: Arc<dyn ProcessRunner>,
}

impl Generator {
    pub fn new(config: Config, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    /// Loads every input and renders the LaTeX source. Failures here are fatal.
    pub fn prepare(&self) -> Result<PreparedDocument, GeneratorError> {
        let paths = &self.config.paths;

        let site = load_site_config(&paths.site_config)?;
        let resume = load_resume(&paths.resume, site.strict_schema())?;
        let document = load_document_config(&paths.document_config_candidates, &site)?;

        let template =
            std::fs::read_to_string(&paths.template).map_err(|source| GeneratorError::Template {
                path: paths.template.clone(),
                source,
            })?;

        let context = build_context(&resume.data, &document);
        let latex = render_document(&template, &context);
        let pdf_file_name = document.pdf_file_name(resume.data.subject_name());

        Ok(PreparedDocument {
            latex,
            document,
            pdf_file_name,
            issues: resume.issues,
        })
    }

    /// Writes the source and drives the external tools. Never fails; the
    /// report says what was produced.
    pub async fn publish(&self, doc: PreparedDocument) -> PipelineReport {
        let paths = &self.config.paths;
        let timeout = self.config.tool_timeout;
        let runner = self.runner.as_ref();

        let mut report = PipelineReport {
            issues: doc.issues,
            ..Default::default()
        };

        let tex_path = paths.output_dir.join(&doc.document.tex_name);
        let html_path = paths.output_dir.join(&doc.document.html_name);
        let pdf_path = paths.downloads_dir.join(&doc.pdf_file_name);

        match write_source(&tex_path, &doc.latex).await {
            Ok(()) => {
                info!("LaTeX written: {}", tex_path.display());
                report.tex_path = Some(tex_path.clone());
                report.record(Step::WriteSource, StepStatus::Succeeded(tex_path.display().to_string()));
            }
            Err(e) => {
                warn!("Failed to write {}: {e}", tex_path.display());
                report.record(Step::WriteSource, StepStatus::Failed(e.to_string()));
            }
        }

        match tools::convert_document(runner, &tex_path, &html_path, timeout).await {
            Ok(()) => {
                info!("HTML generated: {}", html_path.display());
                report.html_path = Some(html_path.clone());
                report.record(Step::HtmlConversion, StepStatus::Succeeded(html_path.display().to_string()));
            }
            Err(e) => {
                warn!("HTML conversion failed: {e}");
                report.record(Step::HtmlConversion, failure_status(&e));
            }
        }

        let preferred = doc.document.pdf_engine.as_deref();
        let engine = tools::detect_engine(runner, preferred, timeout).await;
        let compiled = match &engine {
            Some(engine) => {
                info!("Using LaTeX engine {engine}");
                report.record(Step::EngineDetection, StepStatus::Succeeded(engine.clone()));
                match tools::compile_pdf(runner, engine, &tex_path, &pdf_path, timeout).await {
                    Ok(path) => {
                        info!("PDF generated with {engine}: {}", path.display());
                        report.record(Step::PdfCompile, StepStatus::Succeeded(path.display().to_string()));
                        true
                    }
                    Err(e) => {
                        warn!("Falling back to pandoc PDF (engine compile failed): {e}");
                        if let ToolFailure::Status { details, .. } = &e {
                            if !details.is_empty() {
                                warn!("{engine} output:\n{details}");
                            }
                        }
                        report.record(Step::PdfCompile, failure_status(&e));
                        false
                    }
                }
            }
            None => {
                warn!("No LaTeX engine detected (xelatex/lualatex/pdflatex). Using pandoc fallback.");
                report.record(
                    Step::EngineDetection,
                    StepStatus::Skipped("no LaTeX engine available".to_string()),
                );
                false
            }
        };
        report.engine = engine;

        if compiled {
            report.pdf_path = Some(pdf_path);
        } else {
            let fallback_engine = preferred.unwrap_or(DEFAULT_PDF_ENGINE);
            let converted = match tokio::fs::create_dir_all(&paths.downloads_dir).await {
                Ok(()) => {
                    tools::convert_to_pdf(runner, &tex_path, &pdf_path, fallback_engine, timeout).await
                }
                Err(source) => Err(ToolFailure::Publish {
                    path: paths.downloads_dir.clone(),
                    source,
                }),
            };
            match converted {
                Ok(()) => {
                    info!("PDF generated via pandoc: {}", pdf_path.display());
                    report.record(Step::PdfFallback, StepStatus::Succeeded(pdf_path.display().to_string()));
                    report.pdf_path = Some(pdf_path);
                }
                Err(e) => {
                    warn!("PDF generation failed: {e}");
                    report.record(Step::PdfFallback, failure_status(&e));
                }
            }
        }

        info!("Done");
        report
    }

    pub async fn run(&self) -> Result<PipelineReport, GeneratorError> {
        let doc = self.prepare()?;
        Ok(self.publish(doc).await)
    }
}

fn failure_status(err: &ToolFailure) -> StepStatus {
    if err.is_unavailable() {
        StepStatus::Skipped(err.to_string())
    } else {
        StepStatus::Failed(err.to_string())
    }
}

async fn write_source(path: &std::path::Path, latex: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, latex).await
}
