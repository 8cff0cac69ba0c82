#![deny(unsafe_code)]
//! testuqwordladder: a black-box conformance harness
//!
//! Runs a candidate program against the tests of a job file and compares its stdout, stderr and exit status with
//! fixtures recorded from a reference program. Each test runs as three processes: the candidate, plus one `cmp`
//! per output stream reading the candidate's output through a pipe.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `harness` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! ## Unsafe Policy
//!
//! The only unsafe block registers the SIGINT handler in `harness::interrupt`.

pub mod cli;
pub mod harness;
pub mod job;

pub use harness::{HarnessConfig, HarnessError, RunSummary, StopRequest};
pub use job::{JobError, load_job_file};
pub use testuqwordladder_core::TestDescriptor;
