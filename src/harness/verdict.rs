//! Per-test verdicts and the run summary.

use std::fs;

use testuqwordladder_core::status::{COMPARATOR_IDENTICAL, exit};
use testuqwordladder_core::{FixtureKind, TestDescriptor, parse_exit_status};

use super::errors::{HarnessError, HarnessResult};
use super::outcome::{ExecutionOutcome, Role};

/// Result of comparing one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Matches,
    Differs,
}

impl Comparison {
    fn from_bool(matches: bool) -> Self {
        if matches { Comparison::Matches } else { Comparison::Differs }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comparison::Matches => "matches",
            Comparison::Differs => "differs",
        }
    }
}

/// The three compared dimensions of a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub stdout: Comparison,
    pub stderr: Comparison,
    pub exit_status: Comparison,
}

impl Dimensions {
    /// Dimensions in report order: stdout, stderr, exit status.
    pub fn in_order(&self) -> [(FixtureKind, Comparison); 3] {
        [
            (FixtureKind::Stdout, self.stdout),
            (FixtureKind::Stderr, self.stderr),
            (FixtureKind::ExitStatus, self.exit_status),
        ]
    }

    pub fn matches(&self) -> usize {
        self.in_order().iter().filter(|(_, c)| *c == Comparison::Matches).count()
    }
}

/// Verdict for a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Some participant could not be launched; nothing was compared.
    ExecutionError(Role),
    Compared(Dimensions),
}

impl Verdict {
    pub fn matches(&self) -> usize {
        match self {
            Verdict::ExecutionError(_) => 0,
            Verdict::Compared(dims) => dims.matches(),
        }
    }

    /// A test passes iff all three dimensions match.
    pub fn passed(&self) -> bool {
        self.matches() == FixtureKind::ALL.len()
    }
}

/// Turn the terminations of a test's participants into a verdict.
///
/// ## Errors
/// - The `.exitstatus` fixture cannot be read. Fixture problems abort the run.
pub fn judge(test: &TestDescriptor, outcome: &ExecutionOutcome) -> HarnessResult<Verdict> {
    if let Some(role) = outcome.launch_failure() {
        return Ok(Verdict::ExecutionError(role));
    }

    let expected = read_expected_exit_status(test)?;

    Ok(Verdict::Compared(Dimensions {
        stdout: Comparison::from_bool(outcome.stdout_comparator.exited_with(COMPARATOR_IDENTICAL)),
        stderr: Comparison::from_bool(outcome.stderr_comparator.exited_with(COMPARATOR_IDENTICAL)),
        exit_status: Comparison::from_bool(outcome.candidate.exited_with(expected)),
    }))
}

fn read_expected_exit_status(test: &TestDescriptor) -> HarnessResult<i32> {
    let path = test.fixture(FixtureKind::ExitStatus);
    let bytes = fs::read(path).map_err(|source| HarnessError::FixtureRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_exit_status(&String::from_utf8_lossy(&bytes)))
}

/// Counts accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Tests whose verdict was reported.
    pub run: usize,
    pub passed: usize,
}

impl Tally {
    pub fn record(&mut self, verdict: &Verdict) {
        self.run += 1;
        if verdict.passed() {
            self.passed += 1;
        }
    }

    pub fn finish(self, declared: usize, interrupted: bool) -> RunSummary {
        RunSummary {
            declared,
            run: self.run,
            passed: self.passed,
            interrupted,
        }
    }
}

/// Final state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Tests listed in the job file.
    pub declared: usize,
    /// Tests that completed and were reported.
    pub run: usize,
    pub passed: usize,
    pub interrupted: bool,
}

impl RunSummary {
    /// Process exit status for this run.
    ///
    /// - interrupted before any test completed: "no tests"
    /// - interrupted later: success, the partial count is informational
    /// - otherwise success only if every declared test passed
    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            if self.run == 0 { exit::NO_TESTS } else { exit::OK }
        } else if self.passed == self.declared {
            exit::OK
        } else {
            exit::UNSUCCESSFUL_TESTS
        }
    }
}
