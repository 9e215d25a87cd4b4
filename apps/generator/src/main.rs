use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_generator::config::Config;
use resume_generator::pipeline::orchestrator::{Generator, RunStatus};
use resume_generator::pipeline::process::TokioProcessRunner;

const FATAL_EXIT_CODE: i32 = 1;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Configuration comes first; logging is not set up yet if it fails.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("generate-resume: {e}");
            std::process::exit(FATAL_EXIT_CODE);
        }
    };

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "resume_generator={level},generate_resume={level}",
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let code = match run(config).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            FATAL_EXIT_CODE
        }
    };
    std::process::exit(code);
}

async fn run(config: Config) -> Result<i32> {
    info!(
        "Generating resume v{} in {}",
        env!("CARGO_PKG_VERSION"),
        config.paths.root().display()
    );

    let generator = Generator::new(config, Arc::new(TokioProcessRunner));
    let report = generator
        .run()
        .await
        .context("Resume generation aborted")?;

    if report.status() == RunStatus::Degraded {
        for outcome in report.steps.iter().filter(|o| !o.status.is_success()) {
            warn!("{}: {}", outcome.step, outcome.status);
        }
    }
    Ok(report.exit_code())
}
