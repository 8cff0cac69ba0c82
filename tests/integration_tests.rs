//! End-to-end runs of the harness against small shell-script programs.

use std::fs::{self, File};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use testuqwordladder::cli::commands::{StopSource, run_job_with};
use testuqwordladder::cli::{CliResult, ExitCode};
use testuqwordladder::harness::{ConsoleReporter, HarnessConfig, HarnessReporter, RunSummary, StopRequest, Verdict};
use testuqwordladder::TestDescriptor;
use testuqwordladder_core::status::exit;

/// A scratch directory with an input file, a job file and a counting reference program.
struct Workspace {
    dir: TempDir,
    job_file: PathBuf,
    config: HarnessConfig,
}

impl Workspace {
    /// `reference_body` runs after the invocation has been counted.
    fn new(test_ids: &[&str], reference_body: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.txt");
        fs::write(&input, "cold\ncord\nword\nwarm\n").unwrap();

        let job_file = dir.path().join("job.txt");
        let mut job = String::from("# id\tinput\targs\n");
        for id in test_ids {
            job.push_str(&format!("{id}\t{}\t--limit\t3\n", input.display()));
        }
        fs::write(&job_file, job).unwrap();
        set_mtime(&job_file, SystemTime::now() - Duration::from_secs(60));

        let counter = dir.path().join("reference.count");
        let reference = script(
            dir.path(),
            "reference.sh",
            &format!("echo run >> '{}'\n{reference_body}", counter.display()),
        );
        let config = HarnessConfig::new()
            .with_test_dir(dir.path().join("tmp"))
            .with_reference_program(reference);

        Self { dir, job_file, config }
    }

    fn program(&self, name: &str, body: &str) -> String {
        script(self.dir.path(), name, body)
    }

    fn reference_runs(&self) -> usize {
        fs::read_to_string(self.dir.path().join("reference.count"))
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    fn run(&self, program: &str) -> (CliResult<ExitCode>, String) {
        self.run_with(program, StopSource::Manual(StopRequest::new()))
    }

    fn run_with(&self, program: &str, stop: StopSource) -> (CliResult<ExitCode>, String) {
        let mut reporter = ConsoleReporter::new(Vec::new());
        let result = run_job_with(&self.job_file, program, &self.config, stop, &mut reporter);
        (result, String::from_utf8(reporter.into_inner()).unwrap())
    }
}

fn script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

fn set_mtime(path: &Path, time: SystemTime) {
    File::options().write(true).open(path).unwrap().set_modified(time).unwrap();
}

const REFERENCE: &str = "head -n 2; echo \"limit $2\" >&2; exit 2";

#[test]
fn test_matching_candidate_passes() {
    let ws = Workspace::new(&["t1"], REFERENCE);
    let program = ws.program("candidate.sh", REFERENCE);

    let (result, out) = ws.run(&program);
    assert_eq!(result.unwrap(), ExitCode::SUCCESS);
    assert_eq!(
        out,
        "Rebuilding expected output for test t1\n\
         Running test t1\n\
         Job t1: Stdout matches\n\
         Job t1: Stderr matches\n\
         Job t1: Exit status matches\n\
         testuqwordladder: 1 out of 1 tests passed\n"
    );
}

#[test]
fn test_wrong_exit_status_fails() {
    let ws = Workspace::new(&["t1"], REFERENCE);
    let program = ws.program("candidate.sh", "head -n 2; echo \"limit $2\" >&2; exit 0");

    let (result, out) = ws.run(&program);
    assert_eq!(result.unwrap(), ExitCode(exit::UNSUCCESSFUL_TESTS));
    assert!(out.contains("Job t1: Stdout matches\nJob t1: Stderr matches\nJob t1: Exit status differs\n"));
    assert!(out.ends_with("testuqwordladder: 0 out of 1 tests passed\n"));
}

#[test]
fn test_output_difference_is_reported_per_stream() {
    let ws = Workspace::new(&["t1"], REFERENCE);
    let program = ws.program("candidate.sh", "head -n 3; echo \"limit $2\" >&2; exit 2");

    let (_, out) = ws.run(&program);
    assert!(out.contains("Job t1: Stdout differs\nJob t1: Stderr matches\nJob t1: Exit status matches\n"));
}

#[test]
fn test_unexecutable_candidate_continues_with_next_test() {
    let ws = Workspace::new(&["t1", "t2"], REFERENCE);

    let (result, out) = ws.run("/definitely/not/a/program");
    assert_eq!(result.unwrap(), ExitCode(exit::UNSUCCESSFUL_TESTS));
    assert!(out.contains("Running test t1\nUnable to execute test t1\nRunning test t2\nUnable to execute test t2\n"));
    assert!(out.ends_with("testuqwordladder: 0 out of 2 tests passed\n"));
}

#[test]
fn test_hung_candidate_is_killed_at_deadline() {
    let mut ws = Workspace::new(&["t1"], REFERENCE);
    ws.config.deadline = Duration::from_millis(300);
    let program = ws.program("candidate.sh", "exec sleep 30");

    let (result, out) = ws.run(&program);
    assert_eq!(result.unwrap(), ExitCode(exit::UNSUCCESSFUL_TESTS));
    assert!(out.contains("Job t1: Exit status differs\n"));
}

#[test]
fn test_fixture_regeneration_is_idempotent() {
    let ws = Workspace::new(&["t1", "t2"], REFERENCE);
    let program = ws.program("candidate.sh", REFERENCE);

    let (_, first) = ws.run(&program);
    assert_eq!(ws.reference_runs(), 2);
    assert!(first.starts_with("Rebuilding expected output for test t1\nRebuilding expected output for test t2\n"));

    let (result, second) = ws.run(&program);
    assert_eq!(result.unwrap(), ExitCode::SUCCESS);
    assert_eq!(ws.reference_runs(), 2);
    assert!(!second.contains("Rebuilding"));
}

#[test]
fn test_newer_job_file_regenerates_every_test() {
    let ws = Workspace::new(&["t1", "t2"], REFERENCE);
    let program = ws.program("candidate.sh", REFERENCE);
    ws.run(&program).0.unwrap();

    set_mtime(&ws.job_file, SystemTime::now() + Duration::from_secs(60));

    let (_, out) = ws.run(&program);
    assert_eq!(ws.reference_runs(), 4);
    assert!(out.contains("Rebuilding expected output for test t1\n"));
    assert!(out.contains("Rebuilding expected output for test t2\n"));
}

#[test]
fn test_recreate_regenerates_every_test() {
    let mut ws = Workspace::new(&["t1"], REFERENCE);
    let program = ws.program("candidate.sh", REFERENCE);
    ws.run(&program).0.unwrap();

    ws.config.recreate = true;
    ws.run(&program).0.unwrap();
    assert_eq!(ws.reference_runs(), 2);
}

#[test]
fn test_fixture_files_have_expected_contents() {
    let ws = Workspace::new(&["t1"], REFERENCE);
    let program = ws.program("candidate.sh", REFERENCE);
    ws.run(&program).0.unwrap();

    let fixtures = ws.config.test_dir.clone();
    assert_eq!(fs::read_to_string(fixtures.join("t1.stdout")).unwrap(), "cold\ncord\n");
    assert_eq!(fs::read_to_string(fixtures.join("t1.stderr")).unwrap(), "limit 3\n");
    assert_eq!(fs::read_to_string(fixtures.join("t1.exitstatus")).unwrap(), "2\n");
}

#[test]
fn test_interrupt_before_first_test_completes() {
    let ws = Workspace::new(&["t1", "t2"], REFERENCE);
    let program = ws.program("candidate.sh", REFERENCE);
    let stop = StopRequest::new();
    stop.request();

    let (result, out) = ws.run_with(&program, StopSource::Manual(stop));
    assert_eq!(result.unwrap(), ExitCode(exit::NO_TESTS));
    assert!(out.ends_with("Running test t1\ntestuqwordladder: No tests have been completed\n"));
}

/// Forwards to the console reporter and runs `hook` whenever a test starts.
struct OnStart<F: FnMut(&TestDescriptor)> {
    inner: ConsoleReporter<Vec<u8>>,
    hook: F,
}

impl<F: FnMut(&TestDescriptor)> OnStart<F> {
    fn new(hook: F) -> Self {
        Self {
            inner: ConsoleReporter::new(Vec::new()),
            hook,
        }
    }

    fn output(self) -> String {
        String::from_utf8(self.inner.into_inner()).unwrap()
    }
}

impl<F: FnMut(&TestDescriptor)> HarnessReporter for OnStart<F> {
    fn on_rebuild(&mut self, test: &TestDescriptor) {
        self.inner.on_rebuild(test);
    }

    fn on_test_start(&mut self, test: &TestDescriptor) {
        self.inner.on_test_start(test);
        (self.hook)(test);
    }

    fn on_verdict(&mut self, test: &TestDescriptor, verdict: &Verdict) {
        self.inner.on_verdict(test, verdict);
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        self.inner.on_run_complete(summary);
    }
}

#[test]
fn test_interrupt_after_first_test_reports_partial_count() {
    let ws = Workspace::new(&["t1", "t2", "t3"], REFERENCE);
    let program = ws.program("candidate.sh", REFERENCE);
    let stop = StopRequest::new();
    let raise = stop.clone();
    let mut reporter = OnStart::new(move |test: &TestDescriptor| {
        if test.id == "t2" {
            raise.request();
        }
    });

    let result = run_job_with(&ws.job_file, &program, &ws.config, StopSource::Manual(stop), &mut reporter);
    let out = reporter.output();

    assert_eq!(result.unwrap(), ExitCode::SUCCESS);
    assert!(out.ends_with("Running test t2\ntestuqwordladder: 1 out of 1 tests passed\n"));
    assert!(!out.contains("Job t2"));
    assert!(out.contains("Rebuilding expected output for test t3\n"));
    assert!(!out.contains("Running test t3"));
    assert!(!out.contains("Job t3"));
}

#[test]
fn test_input_removed_after_loading_is_an_execution_error() {
    let ws = Workspace::new(&["t1"], REFERENCE);
    let program = ws.program("candidate.sh", REFERENCE);
    let mut reporter = OnStart::new(|test: &TestDescriptor| fs::remove_file(&test.input_file).unwrap());

    let result = run_job_with(
        &ws.job_file,
        &program,
        &ws.config,
        StopSource::Manual(StopRequest::new()),
        &mut reporter,
    );
    let out = reporter.output();

    assert_eq!(result.unwrap(), ExitCode(exit::UNSUCCESSFUL_TESTS));
    assert!(out.contains("Running test t1\nUnable to execute test t1\n"));
    assert!(!out.contains("Job t1"));
    assert!(out.ends_with("testuqwordladder: 0 out of 1 tests passed\n"));
}

#[test]
fn test_unlaunchable_comparator_is_an_execution_error() {
    let mut ws = Workspace::new(&["t1", "t2"], REFERENCE);
    ws.config.comparator_program = "/definitely/not/a/cmp".to_string();
    let program = ws.program("candidate.sh", REFERENCE);

    let (result, out) = ws.run(&program);
    assert_eq!(result.unwrap(), ExitCode(exit::UNSUCCESSFUL_TESTS));
    assert!(out.contains("Running test t1\nUnable to execute test t1\nRunning test t2\nUnable to execute test t2\n"));
    assert!(out.ends_with("testuqwordladder: 0 out of 2 tests passed\n"));
}

#[test]
fn test_candidate_exiting_with_reserved_status_is_an_execution_error() {
    let ws = Workspace::new(&["t1"], REFERENCE);
    let program = ws.program("candidate.sh", "head -n 2; echo \"limit $2\" >&2; exit 99");

    let (result, out) = ws.run(&program);
    assert_eq!(result.unwrap(), ExitCode(exit::UNSUCCESSFUL_TESTS));
    assert!(out.contains("Running test t1\nUnable to execute test t1\n"));
    assert!(!out.contains("Job t1"));
}

#[test]
fn test_missing_reference_aborts_with_fixture_error() {
    let mut ws = Workspace::new(&["t1"], REFERENCE);
    ws.config.reference_program = "/definitely/not/a/reference".to_string();
    let program = ws.program("candidate.sh", REFERENCE);

    let err = ws.run(&program).0.unwrap_err();
    assert_eq!(err.exit_code, ExitCode(exit::FIXTURE_FILE));
    assert!(err.message.starts_with("testuqwordladder: Can't open output file \""));
    assert!(err.message.ends_with("t1.exitstatus\" for writing"));
}

#[test]
fn test_uncreatable_test_dir() {
    let mut ws = Workspace::new(&["t1"], REFERENCE);
    let dir = ws.dir.path().join("missing/parent");
    ws.config.test_dir = dir.clone();

    let err = ws.run("true").0.unwrap_err();
    assert_eq!(err.exit_code, ExitCode(exit::TEST_DIR_CREATE));
    assert_eq!(
        err.message,
        format!("testuqwordladder: Unable to create directory named \"{}\"", dir.display())
    );
}

#[test]
fn test_job_file_errors_come_before_directory_creation() {
    let ws = Workspace::new(&["t1"], REFERENCE);
    fs::write(&ws.job_file, "t1\tin.txt\nbroken line\n").unwrap();

    let err = ws.run("true").0.unwrap_err();
    assert_eq!(err.exit_code, ExitCode(exit::INPUT_FILE_OPEN));
    assert!(!ws.config.test_dir.exists());
}

#[test]
fn test_binary_usage_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_testuqwordladder"))
        .arg("only-one-operand")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(exit::USAGE));
    assert!(output.stdout.is_empty());
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        "Usage: testuqwordladder [--diffshow N] [--testdir dir] [--recreate] jobspecfile program\n"
    );
}

#[test]
fn test_binary_job_file_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.txt");
    let output = Command::new(env!("CARGO_BIN_EXE_testuqwordladder"))
        .arg(&missing)
        .arg("true")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(exit::JOB_FILE_OPEN));
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        format!("testuqwordladder: Unable to open job file \"{}\"\n", missing.display())
    );
}
