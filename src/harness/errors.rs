//! Errors that abort a harness run.
//!
//! Only filesystem-level problems with fixtures (and the plumbing needed to build a pipeline) are errors here.
//! Launch failures, mismatches, deadline kills and interruptions are ordinary outcomes and never surface as a
//! `HarnessError`.

use std::path::PathBuf;

use testuqwordladder_core::status::exit;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Unable to create directory named \"{}\"", path.display())]
    TestDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Can't open output file \"{}\" for writing", path.display())]
    FixtureCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stat of a fixture or of the job file failed. Reported against the fixture being checked.
    #[error("Can't open output file \"{}\" for writing", path.display())]
    FixtureStat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Can't open output file \"{}\" for writing", path.display())]
    FixtureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The reference program could not be started; `path` is the exit-status fixture left unwritten.
    #[error("Can't open output file \"{}\" for writing", path.display())]
    ReferenceLaunch {
        test_id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The reference program was terminated by a signal, so there is no exit status to record.
    #[error("Can't open output file \"{}\" for writing", path.display())]
    ReferenceAbnormalExit { test_id: String, path: PathBuf },

    #[error("unable to create pipe: {0}")]
    Pipe(#[from] nix::Error),
}

impl HarnessError {
    /// Process exit status the harness uses when this error aborts the run.
    pub fn exit_code(&self) -> i32 {
        match self {
            HarnessError::TestDir { .. } => exit::TEST_DIR_CREATE,
            HarnessError::FixtureCreate { .. }
            | HarnessError::FixtureStat { .. }
            | HarnessError::FixtureRead { .. }
            | HarnessError::ReferenceLaunch { .. }
            | HarnessError::ReferenceAbnormalExit { .. } => exit::FIXTURE_FILE,
            HarnessError::Pipe(_) => exit::PIPE_SETUP,
        }
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_errors_share_output_file_message() {
        let err = HarnessError::ReferenceAbnormalExit {
            test_id: "t1".to_string(),
            path: PathBuf::from("tmp/t1.exitstatus"),
        };
        assert_eq!(err.to_string(), "Can't open output file \"tmp/t1.exitstatus\" for writing");
        assert_eq!(err.exit_code(), exit::FIXTURE_FILE);
    }

    #[test]
    fn test_test_dir_error_code() {
        let err = HarnessError::TestDir {
            path: PathBuf::from("/nope/dir"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.to_string(), "Unable to create directory named \"/nope/dir\"");
        assert_eq!(err.exit_code(), exit::TEST_DIR_CREATE);
    }

    #[test]
    fn test_pipe_error_does_not_use_launch_failure_status() {
        let err = HarnessError::from(nix::Error::EMFILE);
        assert_eq!(err.exit_code(), exit::PIPE_SETUP);
        assert_ne!(err.exit_code(), testuqwordladder_core::LAUNCH_FAILURE_STATUS);
        assert!(err.to_string().starts_with("unable to create pipe: "));
    }
}
