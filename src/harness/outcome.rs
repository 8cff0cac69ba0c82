//! How each participant of a test ended.

use std::process::ExitStatus;

use testuqwordladder_core::LAUNCH_FAILURE_STATUS;

/// The three roles of a test pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Candidate,
    StdoutComparator,
    StderrComparator,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::StdoutComparator => "stdout comparator",
            Role::StderrComparator => "stderr comparator",
        }
    }
}

/// Termination classification of one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Exited normally with this code.
    Completed(i32),
    /// Terminated by a signal instead of exiting, normally the deadline kill.
    KilledByDeadline,
    /// The program image could not be executed.
    LaunchFailure,
}

impl Termination {
    /// Classify a reaped exit status.
    ///
    /// An exit with [`LAUNCH_FAILURE_STATUS`] counts as a launch failure, so wrappers that report exec errors
    /// through that status are treated the same as a failed spawn.
    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(LAUNCH_FAILURE_STATUS) => Termination::LaunchFailure,
            Some(code) => Termination::Completed(code),
            None => Termination::KilledByDeadline,
        }
    }

    /// `true` only for a normal exit with `code`.
    pub fn exited_with(self, code: i32) -> bool {
        self == Termination::Completed(code)
    }
}

/// Termination of all three participants of one test. Consumed immediately by the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub candidate: Termination,
    pub stdout_comparator: Termination,
    pub stderr_comparator: Termination,
}

impl ExecutionOutcome {
    pub fn get(&self, role: Role) -> Termination {
        match role {
            Role::Candidate => self.candidate,
            Role::StdoutComparator => self.stdout_comparator,
            Role::StderrComparator => self.stderr_comparator,
        }
    }

    /// First role that failed to launch, if any.
    pub fn launch_failure(&self) -> Option<Role> {
        [Role::Candidate, Role::StdoutComparator, Role::StderrComparator]
            .into_iter()
            .find(|&role| self.get(role) == Termination::LaunchFailure)
    }
}
