//! Test execution engine.
//!
//! ## Modules
//!
//! - `fixtures` - Fixture freshness checks and regeneration from the reference program
//! - `pipeline` - The candidate → comparator process topology of one test
//! - `coordinator` - Deadline, kill, reap and the per-test loop
//! - `verdict` - Turning exit statuses into verdicts and the run summary
//! - `reporter` - Report output, kept apart from execution
//! - `interrupt` - The run-wide stop request and its SIGINT source
//!
//! Fixture materialization always completes before the first test is launched, so fixtures are never written and
//! read at the same time.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod config;
pub mod coordinator;
pub mod errors;
pub mod fixtures;
pub mod interrupt;
pub mod outcome;
pub mod pipeline;
pub mod reporter;
pub mod verdict;

pub use config::{DeadlinePolicy, HarnessConfig};
pub use coordinator::{execute_test, run_tests};
pub use errors::{HarnessError, HarnessResult};
pub use fixtures::{Materialized, ensure_test_dir, materialize};
pub use interrupt::StopRequest;
pub use outcome::{ExecutionOutcome, Role, Termination};
pub use reporter::{ConsoleReporter, HarnessReporter};
pub use verdict::{Comparison, Dimensions, RunSummary, Verdict};
