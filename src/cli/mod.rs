//! CLI module for the testuqwordladder harness
//!
//! ```text
//! testuqwordladder [--testdir dir] [--recreate] jobspecfile program
//! ```
//!
//! ## Modules
//!
//! - `commands` - The job run itself
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use clap::error::ErrorKind;
use testuqwordladder_core::status::exit;
use tracing::debug;

use crate::harness::config::{DEFAULT_REFERENCE_PROGRAM, DEFAULT_TEST_DIR};
use crate::harness::reporter::HARNESS_NAME;
use crate::harness::HarnessError;
use crate::job::JobError;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(exit::OK);
    pub const USAGE: ExitCode = ExitCode(exit::USAGE);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// The usage message (exit code 14).
    pub fn usage() -> Self {
        Self::new(USAGE, ExitCode::USAGE)
    }

    /// A message prefixed with the harness name, with a custom exit code.
    pub fn prefixed(message: impl fmt::Display, code: i32) -> Self {
        Self::new(format!("{HARNESS_NAME}: {message}"), ExitCode(code))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<HarnessError> for CliError {
    fn from(err: HarnessError) -> Self {
        let code = err.exit_code();
        Self::prefixed(err, code)
    }
}

impl From<JobError> for CliError {
    fn from(err: JobError) -> Self {
        let code = err.exit_code();
        Self::prefixed(err, code)
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Printed verbatim for every malformed command line.
pub const USAGE: &str = "Usage: testuqwordladder [--diffshow N] [--testdir dir] [--recreate] jobspecfile program";

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run a candidate program against recorded expected output
#[derive(Parser, Debug)]
#[command(name = "testuqwordladder")]
#[command(version = VERSION)]
#[command(about = "Run a candidate program against recorded expected output", long_about = None)]
pub struct Cli {
    /// Directory holding the expected-output fixtures
    #[arg(long = "testdir", value_name = "DIR", default_value = DEFAULT_TEST_DIR, allow_hyphen_values = true)]
    pub test_dir: PathBuf,

    /// Regenerate every fixture, even when it is up to date
    #[arg(long)]
    pub recreate: bool,

    /// Program used to regenerate fixtures
    #[arg(long, value_name = "PROGRAM", default_value = DEFAULT_REFERENCE_PROGRAM, hide = true)]
    pub reference: String,

    /// Job specification file, one test per line
    #[arg(value_name = "JOBSPECFILE")]
    pub job_file: PathBuf,

    /// Program under test
    #[arg(value_name = "PROGRAM")]
    pub program: String,
}

/// Options must come before both operands and take their value as a separate argument (`--testdir dir`, never
/// `--testdir=dir`). The value of `--testdir` is never an option.
fn options_well_placed(args: &[OsString]) -> bool {
    let mut seen_operand = false;
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        let arg = arg.to_string_lossy();
        if arg.starts_with('-') {
            if seen_operand || arg.contains('=') {
                return false;
            }
            if arg == "--testdir" || arg == "--reference" {
                rest.next();
            }
        } else {
            seen_operand = true;
        }
    }
    true
}

/// Parse a full argument vector (program name first).
///
/// `--help` and `--version` are printed here and come back as an error carrying exit code 0 and no message.
/// Every other problem is the usage error.
pub fn parse_args(args: &[OsString]) -> CliResult<Cli> {
    if !options_well_placed(args) {
        return Err(CliError::usage());
    }
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(cli),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            Err(CliError::new("", ExitCode::SUCCESS))
        }
        Err(e) => {
            debug!(error = %e, "rejected command line");
            Err(CliError::usage())
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let args: Vec<OsString> = env::args_os().collect();

    match execute(&args) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(args: &[OsString]) -> CliResult<ExitCode> {
    let cli = parse_args(args)?;
    commands::run_job(&cli)
}

// ============================================================================
// Tests
// ============================================================================
