//! Provide the shared, IO-free vocabulary of the testuqwordladder harness.
//!
//! This crate is intentionally small and dependency-free. It contains the pieces that both the engine and any
//! tooling around job files need to agree on:
//! - the [`TestDescriptor`] a run iterates over,
//! - the fixture kinds and their on-disk naming convention (`<dir>/<id>.<suffix>`),
//! - the job-specification line grammar, and
//! - the reserved exit statuses exchanged with child processes.
//!
//! ## Notes
//!
//! - No filesystem access happens here. Checks that need IO (for example "is this input file readable?") are
//!   injected by the caller as predicates.

pub mod descriptor;
pub mod fixtures;
pub mod jobspec;
pub mod status;

pub use descriptor::TestDescriptor;
pub use fixtures::{FixtureKind, FixturePaths};
pub use jobspec::{JobEntry, JobSpecError, parse_job_spec};
pub use status::{LAUNCH_FAILURE_STATUS, format_exit_status, parse_exit_status};
