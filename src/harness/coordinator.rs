//! Sequential test execution under a per-test deadline.
//!
//! Each test goes through `launch → wait → kill → reap → judge`. The next test is only launched once every
//! participant of the previous one has been reaped, and the stop request is sampled exactly once per test, right
//! after reaping.

use std::thread;
use std::time::Instant;

use testuqwordladder_core::TestDescriptor;
use tracing::{debug, info};

use super::config::{DeadlinePolicy, HarnessConfig};
use super::errors::HarnessResult;
use super::interrupt::StopRequest;
use super::outcome::ExecutionOutcome;
use super::pipeline::Pipeline;
use super::reporter::HarnessReporter;
use super::verdict::{RunSummary, Tally, judge};

/// Run every test in order and report as results come in.
///
/// ## Parameters
/// - `tests`: tests with current fixtures.
/// - `program`: the candidate program.
/// - `config`: comparator, deadline and polling settings.
/// - `stop`: sampled after each test; when raised, the current test is discarded and the run ends.
/// - `reporter`: receives progress, verdicts and the final summary.
///
/// ## Errors
/// - Pipe creation fails, or an exit-status fixture cannot be read. No summary is reported in that case.
pub fn run_tests(
    tests: &[TestDescriptor],
    program: &str,
    config: &HarnessConfig,
    stop: &StopRequest,
    reporter: &mut dyn HarnessReporter,
) -> HarnessResult<RunSummary> {
    let mut tally = Tally::default();

    for test in tests {
        reporter.on_test_start(test);
        let outcome = execute_test(test, program, config)?;

        if stop.is_requested() {
            info!(test = %test.id, completed = tally.run, "interrupted");
            let summary = tally.finish(tests.len(), true);
            reporter.on_run_complete(&summary);
            return Ok(summary);
        }

        let verdict = judge(test, &outcome)?;
        reporter.on_verdict(test, &verdict);
        tally.record(&verdict);
    }

    let summary = tally.finish(tests.len(), false);
    reporter.on_run_complete(&summary);
    Ok(summary)
}

/// Launch one test's pipeline, wait out the deadline, then kill and reap every participant.
#[tracing::instrument(skip_all, fields(test = %test.id))]
pub fn execute_test(test: &TestDescriptor, program: &str, config: &HarnessConfig) -> HarnessResult<ExecutionOutcome> {
    let mut pipeline = Pipeline::launch(test, program, &config.comparator_program)?;
    wait_for_deadline(&mut pipeline, config);
    pipeline.kill_all();

    let outcome = pipeline.reap();
    debug!(?outcome, "reaped");
    Ok(outcome)
}

fn wait_for_deadline(pipeline: &mut Pipeline, config: &HarnessConfig) {
    match config.deadline_policy {
        DeadlinePolicy::Fixed => thread::sleep(config.deadline),
        DeadlinePolicy::EarlyExit => {
            let deadline = Instant::now() + config.deadline;
            while !pipeline.all_exited() {
                let now = Instant::now();
                if now >= deadline {
                    debug!("deadline reached");
                    return;
                }
                thread::sleep(config.poll_interval.min(deadline - now));
            }
        }
    }
}
