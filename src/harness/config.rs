//! Run-wide harness settings.

use std::path::PathBuf;
use std::time::Duration;

/// Default directory holding the recorded fixtures.
pub const DEFAULT_TEST_DIR: &str = "./tmp";
/// Trusted implementation used to regenerate fixtures.
pub const DEFAULT_REFERENCE_PROGRAM: &str = "good-uqwordladder";
/// Byte-comparison utility; exit status 0 means identical.
pub const DEFAULT_COMPARATOR_PROGRAM: &str = "cmp";
/// Wall-clock budget given to every test before its processes are killed.
pub const DEFAULT_DEADLINE: Duration = Duration::from_millis(1500);

/// How the coordinator spends the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeadlinePolicy {
    /// Stop waiting once every participant has exited, or at the deadline.
    #[default]
    EarlyExit,
    /// Always sleep the whole deadline, even if everything finished instantly.
    Fixed,
}

/// Harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Directory holding `<id>.stdout`, `<id>.stderr` and `<id>.exitstatus`
    pub test_dir: PathBuf,
    /// Regenerate every fixture regardless of timestamps
    pub recreate: bool,
    pub reference_program: String,
    pub comparator_program: String,
    pub deadline: Duration,
    pub deadline_policy: DeadlinePolicy,
    /// Sleep between liveness checks under [`DeadlinePolicy::EarlyExit`]
    pub poll_interval: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            test_dir: PathBuf::from(DEFAULT_TEST_DIR),
            recreate: false,
            reference_program: DEFAULT_REFERENCE_PROGRAM.to_string(),
            comparator_program: DEFAULT_COMPARATOR_PROGRAM.to_string(),
            deadline: DEFAULT_DEADLINE,
            deadline_policy: DeadlinePolicy::default(),
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl HarnessConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.test_dir = dir.into();
        self
    }

    pub fn with_recreate(mut self, recreate: bool) -> Self {
        self.recreate = recreate;
        self
    }

    pub fn with_reference_program(mut self, program: impl Into<String>) -> Self {
        self.reference_program = program.into();
        self
    }

    pub fn with_comparator_program(mut self, program: impl Into<String>) -> Self {
        self.comparator_program = program.into();
        self
    }

    /// Set the deadline applied to every test of the run.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_deadline_policy(mut self, policy: DeadlinePolicy) -> Self {
        self.deadline_policy = policy;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
