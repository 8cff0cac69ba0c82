//! Fixture kinds and naming.
//!
//! Every test owns exactly three fixture files under the test directory: `<id>.stdout`, `<id>.stderr` and
//! `<id>.exitstatus`. The kinds are always visited in that order.

use std::path::{Path, PathBuf};

/// One of the three recorded expectations of a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureKind {
    Stdout,
    Stderr,
    ExitStatus,
}

impl FixtureKind {
    /// All kinds, in the fixed scan and report order.
    pub const ALL: [FixtureKind; 3] = [FixtureKind::Stdout, FixtureKind::Stderr, FixtureKind::ExitStatus];

    /// File-name suffix, without the leading dot.
    pub fn suffix(self) -> &'static str {
        match self {
            FixtureKind::Stdout => "stdout",
            FixtureKind::Stderr => "stderr",
            FixtureKind::ExitStatus => "exitstatus",
        }
    }

    /// Label used in report lines (`Job t1: Exit status matches`).
    pub fn label(self) -> &'static str {
        match self {
            FixtureKind::Stdout => "Stdout",
            FixtureKind::Stderr => "Stderr",
            FixtureKind::ExitStatus => "Exit status",
        }
    }

    /// Build `<dir>/<id>.<suffix>`.
    pub fn path_in(self, test_dir: &Path, id: &str) -> PathBuf {
        test_dir.join(format!("{}.{}", id, self.suffix()))
    }
}

/// The three fixture paths of one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePaths {
    pub stdout: PathBuf,
    pub stderr: PathBuf,
    pub exit_status: PathBuf,
}

impl FixturePaths {
    pub fn new(test_dir: &Path, id: &str) -> Self {
        Self {
            stdout: FixtureKind::Stdout.path_in(test_dir, id),
            stderr: FixtureKind::Stderr.path_in(test_dir, id),
            exit_status: FixtureKind::ExitStatus.path_in(test_dir, id),
        }
    }

    pub fn get(&self, kind: FixtureKind) -> &Path {
        match kind {
            FixtureKind::Stdout => &self.stdout,
            FixtureKind::Stderr => &self.stderr,
            FixtureKind::ExitStatus => &self.exit_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_paths_follow_naming_convention() {
        let paths = FixturePaths::new(Path::new("./tmp"), "t1");
        assert_eq!(paths.stdout, PathBuf::from("./tmp/t1.stdout"));
        assert_eq!(paths.stderr, PathBuf::from("./tmp/t1.stderr"));
        assert_eq!(paths.exit_status, PathBuf::from("./tmp/t1.exitstatus"));
    }

    #[test]
    fn test_trailing_separator_in_dir_is_not_doubled() {
        let path = FixtureKind::Stdout.path_in(Path::new("out/"), "a.b");
        assert_eq!(path, PathBuf::from("out/a.b.stdout"));
    }

    #[test]
    fn test_get_matches_fields() {
        let paths = FixturePaths::new(Path::new("d"), "x");
        for kind in FixtureKind::ALL {
            assert_eq!(paths.get(kind), kind.path_in(Path::new("d"), "x"));
        }
    }

    #[test]
    fn test_labels_in_report_order() {
        let labels: Vec<_> = FixtureKind::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(labels, ["Stdout", "Stderr", "Exit status"]);
    }
}
