//! Report formatting, separated from execution.
//!
//! The engine only talks to a [`HarnessReporter`]. [`ConsoleReporter`] produces the canonical line-oriented
//! report on stdout; other implementations can record events (as the tests do) or render other formats.

use std::io::{self, Write};

use testuqwordladder_core::TestDescriptor;

use super::verdict::{RunSummary, Verdict};

/// Name used as the prefix of summary lines.
pub const HARNESS_NAME: &str = "testuqwordladder";

/// Trait for reporting harness progress and results.
pub trait HarnessReporter {
    /// Called once per stale test, before its reference run
    fn on_rebuild(&mut self, test: &TestDescriptor);

    /// Called before a test's pipeline is launched
    fn on_test_start(&mut self, test: &TestDescriptor);

    /// Called after all participants of a test were reaped
    fn on_verdict(&mut self, test: &TestDescriptor, verdict: &Verdict);

    /// Called once at the end of the run, including interrupted runs
    fn on_run_complete(&mut self, summary: &RunSummary);
}

/// Line-oriented console reporter.
///
/// Every line is flushed immediately so the report interleaves correctly with anything else writing to the same
/// terminal. Write errors (for example a closed stdout) are ignored.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        let _ = self.out.write_fmt(args);
        let _ = self.out.write_all(b"\n");
        let _ = self.out.flush();
    }
}

impl<W: Write> HarnessReporter for ConsoleReporter<W> {
    fn on_rebuild(&mut self, test: &TestDescriptor) {
        self.line(format_args!("Rebuilding expected output for test {}", test.id));
    }

    fn on_test_start(&mut self, test: &TestDescriptor) {
        self.line(format_args!("Running test {}", test.id));
    }

    fn on_verdict(&mut self, test: &TestDescriptor, verdict: &Verdict) {
        match verdict {
            Verdict::ExecutionError(_) => {
                self.line(format_args!("Unable to execute test {}", test.id));
            }
            Verdict::Compared(dims) => {
                for (kind, comparison) in dims.in_order() {
                    self.line(format_args!("Job {}: {} {}", test.id, kind.label(), comparison.as_str()));
                }
            }
        }
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        if summary.interrupted && summary.run == 0 {
            self.line(format_args!("{HARNESS_NAME}: No tests have been completed"));
        } else {
            self.line(format_args!(
                "{HARNESS_NAME}: {} out of {} tests passed",
                summary.passed, summary.run
            ));
        }
    }
}
