//! Exit statuses exchanged with child processes, and the `.exitstatus` fixture format.

/// Status a participant reports when its program image could not be executed.
pub const LAUNCH_FAILURE_STATUS: i32 = 99;

/// Comparator status meaning "inputs identical".
pub const COMPARATOR_IDENTICAL: i32 = 0;

/// Exit statuses of the harness process itself.
pub mod exit {
    pub const OK: i32 = 0;
    pub const DUPLICATE_TEST_ID: i32 = 5;
    pub const FIXTURE_FILE: i32 = 6;
    /// Interrupted before the first test completed.
    pub const NO_TESTS: i32 = 9;
    pub const TEST_DIR_CREATE: i32 = 10;
    pub const EMPTY_JOB_FILE: i32 = 11;
    pub const USAGE: i32 = 14;
    pub const JOB_FILE_SYNTAX: i32 = 16;
    /// At least one declared test did not pass.
    pub const UNSUCCESSFUL_TESTS: i32 = 18;
    pub const INPUT_FILE_OPEN: i32 = 19;
    pub const JOB_FILE_OPEN: i32 = 20;
    /// Per-test plumbing (pipes) could not be set up. Distinct from [`super::LAUNCH_FAILURE_STATUS`].
    pub const PIPE_SETUP: i32 = 1;
}

/// Render an exit status the way it is stored in an `.exitstatus` fixture: decimal, newline-terminated.
pub fn format_exit_status(code: i32) -> String {
    format!("{code}\n")
}

/// Parse the leading integer of an `.exitstatus` fixture.
///
/// Mirrors C `atoi`: leading whitespace is skipped, an optional sign is accepted, and digits are consumed until
/// the first non-digit. Input without a leading integer yields `0`. Values saturate instead of overflowing.
pub fn parse_exit_status(text: &str) -> i32 {
    let rest = text.trim_start();
    let (negative, digits) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = (value * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
    }
    let value = if negative { -value } else { value };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
