//! The immutable description of a single test case.

use std::path::{Path, PathBuf};

use crate::fixtures::{FixtureKind, FixturePaths};
use crate::jobspec::JobEntry;

/// One validated test case.
///
/// Constructed once per job-file line and only read afterwards. The engine writes to the three fixture files it
/// names, never to the descriptor itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDescriptor {
    /// Unique within a run; never contains `/`.
    pub id: String,
    /// Bound to the standard input of the candidate and reference programs.
    pub input_file: PathBuf,
    /// Appended after the program name for both candidate and reference.
    pub args: Vec<String>,
    pub fixtures: FixturePaths,
}

impl TestDescriptor {
    pub fn new(id: impl Into<String>, input_file: impl Into<PathBuf>, args: Vec<String>, test_dir: &Path) -> Self {
        let id = id.into();
        let fixtures = FixturePaths::new(test_dir, &id);
        Self {
            id,
            input_file: input_file.into(),
            args,
            fixtures,
        }
    }

    /// Build a descriptor from a parsed job-file entry.
    pub fn from_entry(entry: JobEntry, test_dir: &Path) -> Self {
        Self::new(entry.id, entry.input_file, entry.args, test_dir)
    }

    pub fn fixture(&self, kind: FixtureKind) -> &Path {
        self.fixtures.get(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_entry_derives_fixture_paths() {
        let entry = JobEntry {
            line: 3,
            id: "long-ladder".to_string(),
            input_file: "inputs/ladder.txt".to_string(),
            args: vec!["--start".to_string(), "cold".to_string()],
        };
        let test = TestDescriptor::from_entry(entry, Path::new("tmp"));

        assert_eq!(test.id, "long-ladder");
        assert_eq!(test.input_file, PathBuf::from("inputs/ladder.txt"));
        assert_eq!(test.args, ["--start", "cold"]);
        assert_eq!(test.fixture(FixtureKind::Stderr), Path::new("tmp/long-ladder.stderr"));
    }
}
