//! Error types and error code constants for nudge.
//!
//! This module provides a unified error type (`NudgeError`) covering every
//! failure the advisor, job store, and CLI surface can report, plus the
//! stable numeric codes used in JSON error responses and process exit codes.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller, out-of-range move)
//! - `3`: Job not found (accept/reject of an unknown job id)
//! - `4`: Apply errors (failed to write changes)
//! - `5`: Stale job (file changed since the job was computed)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! Parse failure is deliberately absent: an unparseable file yields an empty
//! extraction and no solutions, never an error.

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Job not found (unknown or already-retired job id).
    JobNotFound = 3,
    /// Apply errors (failed to write changes).
    ApplyError = 4,
    /// Stale job (the file changed since the job was computed).
    StaleJob = 5,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the advisor and its CLI surface.
///
/// Each variant carries enough context to produce a helpful message and an
/// optional structured `details` payload in the JSON envelope.
#[derive(Debug, Error)]
pub enum NudgeError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// File not found or not readable as text.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// A move index falls outside the declaration list.
    #[error("move out of range: index {index} with {len} declarations")]
    MoveOutOfRange { index: usize, len: usize },

    /// Job not found in the store.
    #[error("job not found: {id}")]
    JobNotFound { id: String },

    /// The file changed since the job was computed.
    #[error("stale job {id}: the file changed since the job was computed")]
    StaleJob { id: String },

    /// Failed to apply changes to a file.
    #[error("apply error: {message}")]
    Apply {
        message: String,
        file: Option<String>,
    },

    /// I/O failure while reading or writing files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&NudgeError> for OutputErrorCode {
    fn from(err: &NudgeError) -> Self {
        match err {
            NudgeError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            NudgeError::FileNotFound { .. } => OutputErrorCode::InvalidArguments,
            NudgeError::MoveOutOfRange { .. } => OutputErrorCode::InvalidArguments,
            NudgeError::JobNotFound { .. } => OutputErrorCode::JobNotFound,
            NudgeError::StaleJob { .. } => OutputErrorCode::StaleJob,
            NudgeError::Apply { .. } => OutputErrorCode::ApplyError,
            NudgeError::Io(_) => OutputErrorCode::ApplyError,
            NudgeError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<NudgeError> for OutputErrorCode {
    fn from(err: NudgeError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl NudgeError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        NudgeError::InvalidArguments {
            message: message.into(),
            details: None,
        }
    }

    /// Create an invalid arguments error with JSON details.
    pub fn invalid_args_with_details(
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        NudgeError::InvalidArguments {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        NudgeError::FileNotFound { path: path.into() }
    }

    /// Create a move out of range error.
    pub fn move_out_of_range(index: usize, len: usize) -> Self {
        NudgeError::MoveOutOfRange { index, len }
    }

    /// Create a job not found error.
    pub fn job_not_found(id: impl Into<String>) -> Self {
        NudgeError::JobNotFound { id: id.into() }
    }

    /// Create a stale job error.
    pub fn stale_job(id: impl Into<String>) -> Self {
        NudgeError::StaleJob { id: id.into() }
    }

    /// Create an apply error tied to a file.
    pub fn apply(message: impl Into<String>, file: Option<String>) -> Self {
        NudgeError::Apply {
            message: message.into(),
            file,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        NudgeError::Internal {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
