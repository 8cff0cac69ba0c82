//! Loading a job file from disk into test descriptors.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use testuqwordladder_core::status::exit;
use testuqwordladder_core::{JobSpecError, TestDescriptor, parse_job_spec};
use thiserror::Error;
use tracing::debug;

/// A job file that cannot be used. Messages name the job file as given on the command line.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Unable to open job file \"{}\"", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Syntax error on line {line} of job file \"{}\"", path.display())]
    Syntax { path: PathBuf, line: usize },

    #[error("Line {line} of file \"{}\": duplicate test ID", path.display())]
    DuplicateId { path: PathBuf, line: usize },

    #[error("Unable to open input file \"{input}\" specified on line {line} of job file \"{}\"", path.display())]
    UnreadableInput { path: PathBuf, line: usize, input: String },

    #[error("Test file \"{}\" was empty", path.display())]
    Empty { path: PathBuf },
}

impl JobError {
    fn from_spec(path: &Path, err: JobSpecError) -> Self {
        let path = path.to_path_buf();
        match err {
            JobSpecError::Syntax { line } => JobError::Syntax { path, line },
            JobSpecError::DuplicateId { line } => JobError::DuplicateId { path, line },
            JobSpecError::UnreadableInput { line, input } => JobError::UnreadableInput { path, line, input },
            JobSpecError::Empty => JobError::Empty { path },
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            JobError::Open { .. } => exit::JOB_FILE_OPEN,
            JobError::Syntax { .. } => exit::JOB_FILE_SYNTAX,
            JobError::DuplicateId { .. } => exit::DUPLICATE_TEST_ID,
            JobError::UnreadableInput { .. } => exit::INPUT_FILE_OPEN,
            JobError::Empty { .. } => exit::EMPTY_JOB_FILE,
        }
    }
}

/// Read and validate a job file.
///
/// Input-file paths are resolved against the current directory and must be openable for reading. Fixture paths
/// of the returned descriptors live under `test_dir`.
pub fn load_job_file(path: &Path, test_dir: &Path) -> Result<Vec<TestDescriptor>, JobError> {
    let bytes = fs::read(path).map_err(|source| JobError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);

    let entries =
        parse_job_spec(&text, |input| File::open(input).is_ok()).map_err(|err| JobError::from_spec(path, err))?;
    debug!(path = %path.display(), tests = entries.len(), "job file loaded");

    Ok(entries
        .into_iter()
        .map(|entry| TestDescriptor::from_entry(entry, test_dir))
        .collect())
}
