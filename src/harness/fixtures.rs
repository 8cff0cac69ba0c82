//! Fixture freshness and regeneration.
//!
//! A test is stale when any of its three fixtures is missing, older than the job file, or when a rebuild is
//! forced. Stale fixtures are truncated immediately and then rewritten by running the reference program once per
//! stale test. All reference processes run concurrently and are reaped in job-file order.

use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::Path;
use std::process::{Child, Command};
use std::time::SystemTime;

use testuqwordladder_core::{FixtureKind, TestDescriptor, format_exit_status};
use tracing::{debug, info, warn};

use super::config::HarnessConfig;
use super::errors::{HarnessError, HarnessResult};
use super::outcome::Termination;
use super::reporter::HarnessReporter;

/// Create the fixture directory (mode 0700). An existing directory is accepted as is.
pub fn ensure_test_dir(dir: &Path) -> HarnessResult<()> {
    match DirBuilder::new().mode(0o700).create(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(source) => Err(HarnessError::TestDir {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Ids of the tests whose fixtures were regenerated, in job-file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Materialized {
    pub rebuilt: Vec<String>,
}

impl Materialized {
    pub fn is_empty(&self) -> bool {
        self.rebuilt.is_empty()
    }
}

/// Make sure every test has current fixtures.
///
/// ## Parameters
/// - `tests`: all tests of the run.
/// - `job_file`: fixtures older than this file are stale.
/// - `config`: supplies the reference program and the `recreate` flag.
/// - `reporter`: receives one rebuild notice per stale test.
///
/// ## Errors
/// - A fixture cannot be created, truncated or stat'ed.
/// - The reference program cannot be started for some stale test, or does not exit normally.
#[tracing::instrument(skip_all, fields(tests = tests.len(), recreate = config.recreate))]
pub fn materialize(
    tests: &[TestDescriptor],
    job_file: &Path,
    config: &HarnessConfig,
    reporter: &mut dyn HarnessReporter,
) -> HarnessResult<Materialized> {
    let mut job_mtime = None;
    let mut stale = Vec::new();

    for test in tests {
        let mut rebuild = false;
        for kind in FixtureKind::ALL {
            let path = test.fixture(kind);
            if !rebuild && (config.recreate || fixture_outdated(path, job_file, &mut job_mtime)?) {
                rebuild = true;
                reporter.on_rebuild(test);
            }
            if rebuild {
                truncate_create(path)?;
            }
        }
        if rebuild {
            stale.push(test);
        }
    }

    if stale.is_empty() {
        debug!("all fixtures are current");
        return Ok(Materialized::default());
    }

    info!(count = stale.len(), reference = %config.reference_program, "regenerating fixtures");
    regenerate(&stale, &config.reference_program)?;

    Ok(Materialized {
        rebuilt: stale.iter().map(|t| t.id.clone()).collect(),
    })
}

/// `true` if the fixture is missing or was last modified before the job file.
///
/// The job file is stat'ed at most once per run; a failure is reported against the fixture being checked.
fn fixture_outdated(path: &Path, job_file: &Path, job_mtime: &mut Option<SystemTime>) -> HarnessResult<bool> {
    let stat_error = |source| HarnessError::FixtureStat {
        path: path.to_path_buf(),
        source,
    };

    let fixture_mtime = match fs::metadata(path) {
        Ok(meta) => meta.modified().map_err(stat_error)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(source) => return Err(stat_error(source)),
    };

    let job_mtime = match *job_mtime {
        Some(mtime) => mtime,
        None => {
            let mtime = fs::metadata(job_file).and_then(|m| m.modified()).map_err(stat_error)?;
            *job_mtime = Some(mtime);
            mtime
        }
    };

    Ok(fixture_mtime < job_mtime)
}

fn truncate_create(path: &Path) -> HarnessResult<()> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .map(drop)
        .map_err(|source| HarnessError::FixtureCreate {
            path: path.to_path_buf(),
            source,
        })
}

/// Run the reference program for every stale test and record the exit statuses.
///
/// On failure every reference process still running is killed and reaped, and the exit-status fixture of each
/// test that was not completed is removed so the next run sees it as missing.
fn regenerate(stale: &[&TestDescriptor], reference: &str) -> HarnessResult<()> {
    let mut children = Vec::with_capacity(stale.len());
    for test in stale {
        match spawn_reference(test, reference) {
            Ok(child) => children.push(child),
            Err(err) => {
                abandon(children, stale);
                return Err(err);
            }
        }
    }

    let mut pending = children.into_iter();
    for (index, test) in stale.iter().enumerate() {
        let Some(mut child) = pending.next() else { break };
        if let Err(err) = record_exit_status(test, &mut child) {
            abandon(pending, &stale[index..]);
            return Err(err);
        }
    }
    Ok(())
}

/// `reference <args...>` with stdin from the input file and stdout/stderr into the fixtures.
fn spawn_reference(test: &TestDescriptor, reference: &str) -> HarnessResult<Child> {
    let launch_error = |source| HarnessError::ReferenceLaunch {
        test_id: test.id.clone(),
        path: test.fixtures.exit_status.clone(),
        source,
    };

    let input = File::open(&test.input_file).map_err(launch_error)?;
    let stdout = open_fixture(&test.fixtures.stdout)?;
    let stderr = open_fixture(&test.fixtures.stderr)?;

    let child = Command::new(reference)
        .args(&test.args)
        .stdin(input)
        .stdout(stdout)
        .stderr(stderr)
        .spawn()
        .map_err(launch_error)?;
    debug!(test = %test.id, pid = child.id(), "reference started");
    Ok(child)
}

fn open_fixture(path: &Path) -> HarnessResult<File> {
    OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|source| HarnessError::FixtureCreate {
            path: path.to_path_buf(),
            source,
        })
}

fn record_exit_status(test: &TestDescriptor, child: &mut Child) -> HarnessResult<()> {
    let path = &test.fixtures.exit_status;
    let abnormal = || HarnessError::ReferenceAbnormalExit {
        test_id: test.id.clone(),
        path: path.clone(),
    };

    let status = child.wait().map_err(|_| abnormal())?;
    let Termination::Completed(code) = Termination::from_status(status) else {
        return Err(abnormal());
    };

    fs::write(path, format_exit_status(code)).map_err(|source| HarnessError::FixtureCreate {
        path: path.clone(),
        source,
    })
}

fn abandon(children: impl IntoIterator<Item = Child>, unfinished: &[&TestDescriptor]) {
    for mut child in children {
        let _ = child.kill();
        let _ = child.wait();
    }
    for test in unfinished {
        let path = &test.fixtures.exit_status;
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "unable to remove unfinished fixture"),
        }
    }
}
