//! Exit codes and machine-readable error output for the binary.

use serde::Serialize;

/// Process exit codes.
///
/// - 0: duplicates found (or the clean run applied every selected item)
/// - 1: unexpected failure
/// - 2: scan completed, no duplicates
/// - 3: completed, but some items could not be hashed or remediated
/// - 130: interrupted with Ctrl+C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NoDuplicates = 2,
    PartialSuccess = 3,
    Interrupted = 130,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Stable code string used in `--json-errors` output.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::NoDuplicates => "DS002",
            Self::PartialSuccess => "DS003",
            Self::Interrupted => "DS130",
        }
    }
}

/// Error payload printed to stderr as JSON when `--json-errors` is set.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    pub code: String,
    pub exit_code: i32,
    pub message: String,
    pub interrupted: bool,
}

impl StructuredError {
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
