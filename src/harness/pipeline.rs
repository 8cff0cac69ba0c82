//! Per-test process topology.
//!
//! ```text
//!                      pipe A                 ┌──────────────────────────┐
//!   input ─▶ candidate ───stdout──▶ stdin ─▶  │ cmp <id>.stdout  (→ null)│
//!                  │                          └──────────────────────────┘
//!                  │   pipe B                 ┌──────────────────────────┐
//!                  └──────stderr──▶ stdin ─▶  │ cmp <id>.stderr  (→ null)│
//!                                             └──────────────────────────┘
//! ```
//!
//! Pipe ends are owned values. Each end is moved into the `Command` of the one child that uses it and dropped
//! together with that `Command`, so once [`Pipeline::launch`] returns the orchestrator holds no end of either
//! pipe. Both pipes are close-on-exec, which keeps every child down to the ends bound to its standard streams;
//! otherwise a comparator could keep its own input pipe open and never see end-of-stream.

use std::fs::File;
use std::io;
use std::os::fd::OwnedFd;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use nix::fcntl::OFlag;
use nix::unistd;
use testuqwordladder_core::TestDescriptor;
use tracing::{debug, warn};

use super::errors::HarnessResult;
use super::outcome::{ExecutionOutcome, Role, Termination};

/// One process slot of a pipeline.
#[derive(Debug)]
pub enum Participant {
    Spawned(Child),
    NotLaunched,
}

impl Participant {
    fn from_spawn(role: Role, program: &str, result: io::Result<Child>) -> Self {
        match result {
            Ok(child) => {
                debug!(role = role.as_str(), pid = child.id(), "spawned");
                Participant::Spawned(child)
            }
            Err(e) => {
                debug!(role = role.as_str(), program, error = %e, "launch failed");
                Participant::NotLaunched
            }
        }
    }

    /// Non-blocking liveness check. A participant that was never launched counts as exited.
    fn has_exited(&mut self) -> bool {
        match self {
            Participant::Spawned(child) => !matches!(child.try_wait(), Ok(None)),
            Participant::NotLaunched => true,
        }
    }

    /// Send SIGKILL. Already-exited children ignore it.
    fn kill(&mut self) {
        if let Participant::Spawned(child) = self {
            let _ = child.kill();
        }
    }

    /// Block until the participant is reaped and classify how it ended.
    fn reap(&mut self, role: Role) -> Termination {
        match self {
            Participant::NotLaunched => Termination::LaunchFailure,
            Participant::Spawned(child) => match child.wait() {
                Ok(status) => Termination::from_status(status),
                Err(e) => {
                    warn!(role = role.as_str(), error = %e, "unable to reap participant");
                    Termination::KilledByDeadline
                }
            },
        }
    }
}

/// The three concurrently running processes of one test.
#[derive(Debug)]
pub struct Pipeline {
    pub candidate: Participant,
    pub stdout_comparator: Participant,
    pub stderr_comparator: Participant,
}

impl Pipeline {
    /// Start the candidate and both comparators without waiting for any of them.
    ///
    /// ## Parameters
    /// - `test`: supplies the input file, extra arguments and the expected stdout/stderr fixtures.
    /// - `program`: the candidate program.
    /// - `comparator`: the byte-comparison utility, invoked as `<comparator> <fixture>`.
    ///
    /// ## Errors
    /// - Only pipe creation can fail. A participant that cannot be launched becomes
    ///   [`Participant::NotLaunched`] and is classified as a launch failure when reaped.
    pub fn launch(test: &TestDescriptor, program: &str, comparator: &str) -> HarnessResult<Self> {
        let (stdout_read, stdout_write) = cloexec_pipe()?;
        let (stderr_read, stderr_write) = cloexec_pipe()?;

        let candidate = spawn_candidate(test, program, stdout_write, stderr_write);
        let stdout_comparator = spawn_comparator(
            Role::StdoutComparator,
            comparator,
            &test.fixtures.stdout,
            stdout_read,
        );
        let stderr_comparator = spawn_comparator(
            Role::StderrComparator,
            comparator,
            &test.fixtures.stderr,
            stderr_read,
        );

        Ok(Self {
            candidate,
            stdout_comparator,
            stderr_comparator,
        })
    }

    /// `true` once all three participants have exited (or were never launched).
    pub fn all_exited(&mut self) -> bool {
        // Check every participant so each finished child is reaped as early as possible.
        let candidate = self.candidate.has_exited();
        let stdout = self.stdout_comparator.has_exited();
        let stderr = self.stderr_comparator.has_exited();
        candidate && stdout && stderr
    }

    /// Forcefully terminate all three participants. Idempotent.
    pub fn kill_all(&mut self) {
        self.candidate.kill();
        self.stdout_comparator.kill();
        self.stderr_comparator.kill();
    }

    /// Reap every participant and classify each termination.
    pub fn reap(mut self) -> ExecutionOutcome {
        ExecutionOutcome {
            candidate: self.candidate.reap(Role::Candidate),
            stdout_comparator: self.stdout_comparator.reap(Role::StdoutComparator),
            stderr_comparator: self.stderr_comparator.reap(Role::StderrComparator),
        }
    }
}

/// Create a pipe whose ends are both close-on-exec. Returns `(read, write)`.
///
/// Close-on-exec is set in the same call that creates the pipe, so no concurrent spawn can inherit an end.
fn cloexec_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    unistd::pipe2(OFlag::O_CLOEXEC)
}

/// `program <args...>` with stdin from the input file and stdout/stderr into the pipes.
///
/// The write ends are consumed here; they are closed in the orchestrator as soon as this returns.
fn spawn_candidate(test: &TestDescriptor, program: &str, stdout: OwnedFd, stderr: OwnedFd) -> Participant {
    let input = match File::open(&test.input_file) {
        Ok(file) => file,
        Err(e) => {
            warn!(input = %test.input_file.display(), error = %e, "unable to open input file");
            return Participant::NotLaunched;
        }
    };

    let result = Command::new(program)
        .args(&test.args)
        .stdin(input)
        .stdout(stdout)
        .stderr(stderr)
        .spawn();
    Participant::from_spawn(Role::Candidate, program, result)
}

/// `comparator <expected>` reading the pipe, with its own output discarded.
fn spawn_comparator(role: Role, comparator: &str, expected: &Path, input: OwnedFd) -> Participant {
    let result = Command::new(comparator)
        .arg(expected)
        .stdin(input)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    Participant::from_spawn(role, comparator, result)
}
