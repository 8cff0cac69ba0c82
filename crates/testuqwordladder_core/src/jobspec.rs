//! Job-specification line grammar.
//!
//! A job file lists one test per line:
//!
//! ```text
//! <test-id> TAB <input-file> [TAB <arg>]*
//! ```
//!
//! Lines starting with `#` and empty lines are skipped but still counted, so reported line numbers always match
//! what an editor shows. Fields are split on every tab; an empty field between two tabs is kept as an empty
//! argument.

use std::fmt;

/// A syntactically valid, de-duplicated job-file line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEntry {
    /// 1-based line number in the job file.
    pub line: usize,
    pub id: String,
    pub input_file: String,
    pub args: Vec<String>,
}

/// Reasons a job file is rejected. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSpecError {
    Syntax { line: usize },
    DuplicateId { line: usize },
    UnreadableInput { line: usize, input: String },
    Empty,
}

impl fmt::Display for JobSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobSpecError::Syntax { line } => write!(f, "syntax error on line {line}"),
            JobSpecError::DuplicateId { line } => write!(f, "duplicate test ID on line {line}"),
            JobSpecError::UnreadableInput { line, input } => {
                write!(f, "input file \"{input}\" on line {line} cannot be opened")
            }
            JobSpecError::Empty => write!(f, "no tests listed"),
        }
    }
}

impl std::error::Error for JobSpecError {}

/// Parse a whole job file.
///
/// ## Parameters
/// - `text`: the job file contents.
/// - `input_readable`: decides whether an input-file path can be opened for reading. Kept as a predicate so this
///   crate never touches the filesystem.
///
/// ## Returns
/// - the entries in file order, or the error for the first offending line.
///
/// ## Notes
/// - Each line is checked completely (syntax, then duplicate id, then input file) before the next line is looked
///   at, so an unreadable input on line 2 is reported ahead of a syntax error on line 5.
pub fn parse_job_spec<F>(text: &str, mut input_readable: F) -> Result<Vec<JobEntry>, JobSpecError>
where
    F: FnMut(&str) -> bool,
{
    let mut entries: Vec<JobEntry> = Vec::new();

    for (index, raw) in text.split('\n').enumerate() {
        let line = index + 1;
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }

        let entry = parse_line(raw, line).ok_or(JobSpecError::Syntax { line })?;

        if entries.iter().any(|e| e.id == entry.id) {
            return Err(JobSpecError::DuplicateId { line });
        }
        if !input_readable(&entry.input_file) {
            return Err(JobSpecError::UnreadableInput {
                line,
                input: entry.input_file,
            });
        }
        entries.push(entry);
    }

    if entries.is_empty() {
        return Err(JobSpecError::Empty);
    }
    Ok(entries)
}

/// Split one non-comment line, or `None` if it is malformed.
fn parse_line(raw: &str, line: usize) -> Option<JobEntry> {
    let mut fields = raw.split('\t');
    let id = fields.next()?;
    let input_file = fields.next()?;

    if !is_valid_test_id(id) || input_file.is_empty() {
        return None;
    }

    Some(JobEntry {
        line,
        id: id.to_string(),
        input_file: input_file.to_string(),
        args: fields.map(str::to_string).collect(),
    })
}

/// Test ids become file names, so they must be non-empty and free of path separators.
pub fn is_valid_test_id(id: &str) -> bool {
    !id.is_empty() && !id.contains('/')
}
