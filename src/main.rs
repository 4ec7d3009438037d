//! Command-line entry point.
//!
//! Every command prints exactly one JSON envelope to stdout; logs go to
//! stderr. The process exit code matches the `code` field of the error
//! envelope, so scripts can branch without parsing JSON.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use nudge::cli::{parse_at, Cli, Command, LogLevel};
use nudge::engine::Engine;
use nudge::error::{NudgeError, OutputErrorCode};
use nudge::output::{
    emit_response, ApplyResponse, ErrorResponse, JobView, ProposeResponse, ScanResponse,
};
use nudge::serve;
use nudge::types::Position;

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, same as success envelopes.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), NudgeError> {
    let config = cli.global.advisor_config()?;
    let mut engine = Engine::new(config);

    match cli.command {
        Command::Propose { at, file } => execute_propose(&mut engine, at, file),
        Command::Apply { file } => execute_apply(&mut engine, &file),
        Command::Scan { root, include } => execute_scan(&mut engine, &root, &include),
        Command::Serve { debounce_ms } => execute_serve(engine, debounce_ms),
    }
}

// ============================================================================
// Command Executors
// ============================================================================

/// Execute propose: advise on one file and print the best move, if any.
fn execute_propose(
    engine: &mut Engine,
    at: Option<String>,
    file: Option<PathBuf>,
) -> Result<(), NudgeError> {
    let (path, cursor) = match (at, file) {
        (Some(at), _) => parse_at(&at)?,
        (None, Some(file)) => (file.to_string_lossy().to_string(), Position::default()),
        // Unreachable behind clap's argument requirements.
        (None, None) => {
            return Err(NudgeError::invalid_args("either --at or --file is required"));
        }
    };

    let job = engine.propose_file(&path, cursor)?;
    let response = ProposeResponse::new(&path, job.as_ref().map(JobView::from_job));
    emit_response(&response, &mut io::stdout()).map_err(|e| NudgeError::internal(e.to_string()))?;
    let _ = io::stdout().flush();

    Ok(())
}

/// Execute apply: advise on one file and rewrite it in place.
fn execute_apply(engine: &mut Engine, file: &Path) -> Result<(), NudgeError> {
    let path = file.to_string_lossy().to_string();

    let job = engine.apply_file(&path)?;
    let response = ApplyResponse::new(&path, job.as_ref().map(JobView::from_job));
    emit_response(&response, &mut io::stdout()).map_err(|e| NudgeError::internal(e.to_string()))?;
    let _ = io::stdout().flush();

    Ok(())
}

/// Execute scan: advise every source file under a directory.
fn execute_scan(engine: &mut Engine, root: &Path, include: &[String]) -> Result<(), NudgeError> {
    let outcome = engine.scan(root, include)?;

    let jobs: Vec<JobView> = outcome.jobs.iter().map(JobView::from_job).collect();
    let response = ScanResponse::new(root.display().to_string(), outcome.files_scanned, jobs);
    emit_response(&response, &mut io::stdout()).map_err(|e| NudgeError::internal(e.to_string()))?;
    let _ = io::stdout().flush();

    Ok(())
}

/// Execute serve: run the JSON-lines loop on stdio until EOF.
fn execute_serve(engine: Engine, debounce_ms: u64) -> Result<(), NudgeError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| NudgeError::internal(format!("failed to start async runtime: {}", e)))?;
    runtime.block_on(serve::run(engine, Duration::from_millis(debounce_ms)))
}
