//! Invocations of the external document tools: `pandoc` for conversion and a
//! LaTeX engine for the compiled PDF.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use super::process::{ExitStatus, ProcessCommand, ProcessError, ProcessRunner};

pub const CONVERTER: &str = "pandoc";
pub const ENGINE_PREFERENCE: [&str; 3] = ["xelatex", "lualatex", "pdflatex"];
/// Engine handed to pandoc when it produces the PDF itself.
pub const DEFAULT_PDF_ENGINE: &str = "xelatex";
/// Two passes resolve cross references such as `\pageref{LastPage}`.
pub const COMPILE_PASSES: usize = 2;

#[derive(Debug, Error)]
pub enum ToolFailure {
    #[error("{0} is not installed")]
    NotFound(String),

    #[error(transparent)]
    Process(ProcessError),

    #[error("'{command}' finished with {status}")]
    Status {
        command: String,
        status: ExitStatus,
        details: String,
    },

    #[error("expected output {0} was not produced")]
    MissingOutput(PathBuf),

    #[error("failed to publish {path}: {source}")]
    Publish {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ToolFailure {
    /// True when the tool simply isn't available, as opposed to failing.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ToolFailure::NotFound(_))
    }
}

impl From<ProcessError> for ToolFailure {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::CommandNotFound(program) => ToolFailure::NotFound(program),
            other => ToolFailure::Process(other),
        }
    }
}

async fn run_checked(runner: &dyn ProcessRunner, command: ProcessCommand) -> Result<(), ToolFailure> {
    let display = command.display();
    let output = runner.run(command).await?;
    if output.status.success() {
        Ok(())
    } else {
        Err(ToolFailure::Status {
            command: display,
            status: output.status.clone(),
            details: output.tail(10),
        })
    }
}

/// Preferred engine first (when set), then the fixed preference order.
pub fn engine_candidates(preferred: Option<&str>) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    for name in preferred.into_iter().chain(ENGINE_PREFERENCE) {
        let name = name.trim();
        if !name.is_empty() && !candidates.iter().any(|c| c == name) {
            candidates.push(name.to_string());
        }
    }
    candidates
}

/// Returns the first candidate engine that answers a `-version` probe.
pub async fn detect_engine(
    runner: &dyn ProcessRunner,
    preferred: Option<&str>,
    timeout: Duration,
) -> Option<String> {
    for candidate in engine_candidates(preferred) {
        let probe = ProcessCommand::new(&candidate).arg("-version").timeout(timeout);
        match runner.run(probe).await {
            Ok(out) if out.status.success() => {
                debug!("Detected LaTeX engine {candidate}");
                return Some(candidate);
            }
            Ok(out) => debug!("{candidate} probe finished with {}", out.status),
            Err(e) => debug!("{candidate} unavailable: {e}"),
        }
    }
    None
}

/// `pandoc <source> -o <target>`.
pub async fn convert_document(
    runner: &dyn ProcessRunner,
    source: &Path,
    target: &Path,
    timeout: Duration,
) -> Result<(), ToolFailure> {
    let command = ProcessCommand::new(CONVERTER)
        .arg(source.display().to_string())
        .arg("-o")
        .arg(target.display().to_string())
        .timeout(timeout);
    run_checked(runner, command).await
}

/// `pandoc <source> -o <target> --pdf-engine=<engine>`.
pub async fn convert_to_pdf(
    runner: &dyn ProcessRunner,
    source: &Path,
    target: &Path,
    pdf_engine: &str,
    timeout: Duration,
) -> Result<(), ToolFailure> {
    let command = ProcessCommand::new(CONVERTER)
        .arg(source.display().to_string())
        .arg("-o")
        .arg(target.display().to_string())
        .arg(format!("--pdf-engine={pdf_engine}"))
        .timeout(timeout);
    run_checked(runner, command).await
}

/// Compiles `tex` with `engine` from its own directory, then copies the
/// resulting PDF to `target`. Any failed pass aborts the compile.
pub async fn compile_pdf(
    runner: &dyn ProcessRunner,
    engine: &str,
    tex: &Path,
    target: &Path,
    timeout: Duration,
) -> Result<PathBuf, ToolFailure> {
    let work_dir = tex
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    for pass in 1..=COMPILE_PASSES {
        let command = ProcessCommand::new(engine)
            .args([
                "-interaction=nonstopmode",
                "-halt-on-error",
                "-file-line-error",
            ])
            .arg(tex.display().to_string())
            .current_dir(&work_dir)
            .timeout(timeout);
        run_checked(runner, command).await?;
        debug!("{engine} pass {pass}/{COMPILE_PASSES} complete");
    }

    let stem = tex
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "resume".to_string());
    let produced = work_dir.join(format!("{stem}.pdf"));
    if !tokio::fs::try_exists(&produced).await.unwrap_or(false) {
        return Err(ToolFailure::MissingOutput(produced));
    }

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ToolFailure::Publish {
                path: target.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::copy(&produced, target)
        .await
        .map_err(|source| ToolFailure::Publish {
            path: target.to_path_buf(),
            source,
        })?;
    info!("Copied {} to {}", produced.display(), target.display());
    Ok(target.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::mock::{MockProcessRunner, MockResponse};
    use tempfile::TempDir;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[test]
    fn test_engine_candidates_order_and_dedup() {
        assert_eq!(engine_candidates(None), vec!["xelatex", "lualatex", "pdflatex"]);
        assert_eq!(
            engine_candidates(Some("lualatex")),
            vec!["lualatex", "xelatex", "pdflatex"]
        );
        assert_eq!(
            engine_candidates(Some("tectonic")),
            vec!["tectonic", "xelatex", "lualatex", "pdflatex"]
        );
    }

    #[tokio::test]
    async fn test_detect_engine_picks_first_responding() {
        let mock = MockProcessRunner::new()
            .fail("xelatex", 1)
            .succeed("lualatex")
            .succeed("pdflatex");
        let engine = detect_engine(&mock, None, TIMEOUT).await;
        assert_eq!(engine.as_deref(), Some("lualatex"));
        assert!(mock.calls_to("pdflatex").is_empty());
        assert_eq!(mock.calls_to("xelatex")[0].args, vec!["-version"]);
    }

    #[tokio::test]
    async fn test_detect_engine_timeout_counts_as_unavailable() {
        let mock = MockProcessRunner::new().respond("xelatex", MockResponse::Exit(ExitStatus::Timeout));
        assert!(detect_engine(&mock, None, TIMEOUT).await.is_none());
        assert_eq!(mock.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_convert_document_reports_missing_tool() {
        let mock = MockProcessRunner::new();
        let err = convert_document(&mock, Path::new("a.tex"), Path::new("a.html"), TIMEOUT)
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(mock.calls()[0].args, vec!["a.tex", "-o", "a.html"]);
    }

    #[tokio::test]
    async fn test_convert_to_pdf_passes_engine_flag() {
        let mock = MockProcessRunner::new().succeed("pandoc");
        convert_to_pdf(&mock, Path::new("a.tex"), Path::new("a.pdf"), "xelatex", TIMEOUT)
            .await
            .unwrap();
        assert_eq!(
            mock.calls()[0].args,
            vec!["a.tex", "-o", "a.pdf", "--pdf-engine=xelatex"]
        );
    }

    #[tokio::test]
    async fn test_compile_runs_two_passes_and_copies() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("output");
        std::fs::create_dir_all(&out).unwrap();
        let tex = out.join("resume.tex");
        std::fs::write(&tex, "x").unwrap();
        std::fs::write(out.join("resume.pdf"), "%PDF").unwrap();
        let target = dir.path().join("public/downloads/Ada.pdf");

        let mock = MockProcessRunner::new().succeed("xelatex");
        let published = compile_pdf(&mock, "xelatex", &tex, &target, TIMEOUT).await.unwrap();

        assert_eq!(published, target);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "%PDF");
        let calls = mock.calls_to("xelatex");
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].working_dir.as_deref(), Some(out.as_path()));
        assert_eq!(
            calls[0].args[..3],
            ["-interaction=nonstopmode", "-halt-on-error", "-file-line-error"]
        );
    }

    #[tokio::test]
    async fn test_compile_aborts_after_failed_first_pass() {
        let dir = TempDir::new().unwrap();
        let tex = dir.path().join("resume.tex");
        let mock = MockProcessRunner::new().fail("xelatex", 1);
        let err = compile_pdf(&mock, "xelatex", &tex, &dir.path().join("o.pdf"), TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolFailure::Status { .. }));
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_compile_without_pdf_is_missing_output() {
        let dir = TempDir::new().unwrap();
        let tex = dir.path().join("resume.tex");
        let mock = MockProcessRunner::new().succeed("xelatex");
        let err = compile_pdf(&mock, "xelatex", &tex, &dir.path().join("o.pdf"), TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolFailure::MissingOutput(_)));
        assert_eq!(mock.calls().len(), 2);
    }
}
