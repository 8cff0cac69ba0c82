//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::path::Path;

use tracing::{info, warn};

use crate::harness::{
    ConsoleReporter, HarnessConfig, HarnessReporter, StopRequest, ensure_test_dir, materialize, run_tests,
};
use crate::job::load_job_file;

use super::{Cli, CliResult, ExitCode};

/// Where a run's stop request comes from.
#[derive(Debug, Clone)]
pub enum StopSource {
    /// Operator interrupt (SIGINT), installed once fixtures are in place.
    Sigint,
    /// A request raised by the caller.
    Manual(StopRequest),
}

impl StopSource {
    fn activate(self) -> StopRequest {
        match self {
            StopSource::Sigint => StopRequest::on_sigint().unwrap_or_else(|e| {
                warn!(error = %e, "unable to install SIGINT handler; interrupts will not be deferred");
                StopRequest::new()
            }),
            StopSource::Manual(stop) => stop,
        }
    }
}

/// Run the job described by the command line, reporting to stdout.
pub fn run_job(cli: &Cli) -> CliResult<ExitCode> {
    let config = HarnessConfig::new()
        .with_test_dir(&cli.test_dir)
        .with_recreate(cli.recreate)
        .with_reference_program(&cli.reference);

    let mut reporter = ConsoleReporter::stdout();
    run_job_with(&cli.job_file, &cli.program, &config, StopSource::Sigint, &mut reporter)
}

/// Load the job file, bring fixtures up to date, then run every test.
///
/// ## Returns
/// - the exit code derived from the run summary.
///
/// ## Errors
/// - Job-file problems, test-directory creation and fixture filesystem errors. These abort before any test runs
///   (or, for unreadable exit-status fixtures, in the middle of the run without a summary).
pub fn run_job_with(
    job_file: &Path,
    program: &str,
    config: &HarnessConfig,
    stop: StopSource,
    reporter: &mut dyn HarnessReporter,
) -> CliResult<ExitCode> {
    let tests = load_job_file(job_file, &config.test_dir)?;
    ensure_test_dir(&config.test_dir)?;

    let materialized = materialize(&tests, job_file, config, reporter)?;
    if !materialized.is_empty() {
        info!(rebuilt = materialized.rebuilt.len(), "fixtures regenerated");
    }

    let stop = stop.activate();
    let summary = run_tests(&tests, program, config, &stop, reporter)?;
    Ok(ExitCode(summary.exit_code()))
}
