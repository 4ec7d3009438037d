//! JSON output types and serialization for CLI and serve responses.
//!
//! These types are the editor/agent contract. Design rules:
//!
//! 1. **Status first**: every response carries `status` as its first field
//!    (serve events carry `event` first instead).
//! 2. **Versioned**: every envelope carries `schema_version`.
//! 3. **Deterministic**: same input, same output, including field order.
//! 4. **Nullable vs absent**: `null` means "no value" (`"job": null` for a
//!    file with nothing to improve); an absent field means "not applicable".

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use nudge_core::error::{NudgeError, OutputErrorCode};
use nudge_core::job::{Job, JobKind};
use nudge_core::score::Coefficients;
use nudge_core::search::MoveReason;
use nudge_core::types::{Position, Range};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Job View
// ============================================================================

/// Editor-facing view of a stored job.
///
/// Carries everything an editor needs to display the advice (`title`,
/// `reason`, `coefficients`), apply it (`range`, `text`, `position`), and
/// drive the lifecycle (`id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobView {
    /// Stable job identity (`job_` + 16 hex chars).
    pub id: String,
    /// Job family.
    pub kind: JobKind,
    /// File the advice applies to.
    pub file: String,
    /// Human-readable description of the move.
    pub title: String,
    /// Dominant improvement axis.
    pub reason: MoveReason,
    /// Coefficient triple for the proposed order.
    pub coefficients: Coefficients,
    /// Whole-document range the replacement covers.
    pub range: Range,
    /// Full replacement text.
    pub text: String,
    /// Cursor position after applying the replacement.
    pub position: Position,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl JobView {
    pub fn from_job(job: &Job) -> Self {
        JobView {
            id: job.id.to_string(),
            kind: job.kind,
            file: job.file.clone(),
            title: job.title.clone(),
            reason: job.reason,
            coefficients: job.coefficients,
            range: job.range,
            text: job.text.clone(),
            position: job.position,
            created_at: job.created_at.clone(),
        }
    }
}

// ============================================================================
// Command Responses
// ============================================================================

/// Response for `nudge propose`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposeResponse {
    /// Status: "success".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// File the advisor ran on.
    pub file: String,
    /// The proposal, or `null` when the order is already as good as any
    /// single move can make it.
    pub job: Option<JobView>,
}

impl ProposeResponse {
    pub fn new(file: impl Into<String>, job: Option<JobView>) -> Self {
        ProposeResponse {
            status: "success".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            job,
        }
    }
}

/// Response for `nudge apply`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResponse {
    /// Status: "success".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// File the advisor ran on.
    pub file: String,
    /// Whether a move was applied to the file.
    pub applied: bool,
    /// The applied job, or `null` when nothing improves the order.
    pub job: Option<JobView>,
}

impl ApplyResponse {
    pub fn new(file: impl Into<String>, job: Option<JobView>) -> Self {
        ApplyResponse {
            status: "success".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            applied: job.is_some(),
            job,
        }
    }
}

/// Response for `nudge scan`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResponse {
    /// Status: "success".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Root directory scanned.
    pub root: String,
    /// Number of source files the advisor ran on.
    pub files_scanned: u32,
    /// Improving proposals, ordered by file path.
    pub jobs: Vec<JobView>,
}

impl ScanResponse {
    pub fn new(root: impl Into<String>, files_scanned: u32, jobs: Vec<JobView>) -> Self {
        ScanResponse {
            status: "success".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            root: root.into(),
            files_scanned,
            jobs,
        }
    }
}

// ============================================================================
// Error Envelope
// ============================================================================

/// Error information for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code (matches the process exit code).
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from a NudgeError.
    pub fn from_error(err: &NudgeError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let message = err.to_string();

        let details = match err {
            NudgeError::InvalidArguments { details, .. } => details.clone(),
            NudgeError::FileNotFound { path } => Some(serde_json::json!({ "path": path })),
            NudgeError::MoveOutOfRange { index, len } => {
                Some(serde_json::json!({ "index": index, "len": len }))
            }
            NudgeError::JobNotFound { id } => Some(serde_json::json!({ "job": id })),
            NudgeError::StaleJob { id } => Some(serde_json::json!({ "job": id })),
            NudgeError::Apply { file, .. } => file
                .as_ref()
                .map(|file| serde_json::json!({ "file": file })),
            NudgeError::Io(_) | NudgeError::Internal { .. } => None,
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

/// Error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a NudgeError.
    pub fn from_error(err: &NudgeError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }

    /// Create an error response with just code and message.
    pub fn new(code: u8, message: impl Into<String>) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo {
                code,
                message: message.into(),
                details: None,
            },
        }
    }
}

// ============================================================================
// Serve Events
// ============================================================================

/// Serve event: the advice for a file was (re)built.
///
/// Sent after every debounced `change`, including when the new advice set
/// is empty; an empty `jobs` array tells the editor to clear stale advice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsEvent {
    /// Event: "jobs".
    pub event: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// File the advice applies to.
    pub path: String,
    /// Live advice for that file.
    pub jobs: Vec<JobView>,
}

impl JobsEvent {
    pub fn new(path: impl Into<String>, jobs: Vec<JobView>) -> Self {
        JobsEvent {
            event: "jobs".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            path: path.into(),
            jobs,
        }
    }
}

/// Serve event: a job was accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedEvent {
    /// Event: "accepted".
    pub event: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// The accepted job id.
    pub job: String,
    /// File the replacement applies to.
    pub path: String,
    /// Full replacement text for the editor buffer.
    pub text: String,
    /// Cursor position after the replacement.
    pub position: Position,
}

impl AcceptedEvent {
    pub fn new(job: &Job) -> Self {
        AcceptedEvent {
            event: "accepted".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            job: job.id.to_string(),
            path: job.file.clone(),
            text: job.text.clone(),
            position: job.position,
        }
    }
}

/// Serve event: a job was rejected and retired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedEvent {
    /// Event: "rejected".
    pub event: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// The rejected job id.
    pub job: String,
}

impl RejectedEvent {
    pub fn new(job: impl Into<String>) -> Self {
        RejectedEvent {
            event: "rejected".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            job: job.into(),
        }
    }
}

/// Serve event: every live job across all files, in response to `list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEvent {
    /// Event: "list".
    pub event: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// All live jobs, ordered by file path then id.
    pub jobs: Vec<JobView>,
}

impl ListEvent {
    pub fn new(jobs: Vec<JobView>) -> Self {
        ListEvent {
            event: "list".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            jobs,
        }
    }
}

/// Serve event: a request failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// Event: "error".
    pub event: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Numeric error code (same table as CLI exit codes).
    pub code: u8,
    /// Human-readable message.
    pub message: String,
}

impl ErrorEvent {
    pub fn new(code: u8, message: impl Into<String>) -> Self {
        ErrorEvent {
            event: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            code,
            message: message.into(),
        }
    }

    /// Create from a NudgeError.
    pub fn from_error(err: &NudgeError) -> Self {
        ErrorEvent::new(OutputErrorCode::from(err).code(), err.to_string())
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit a response as compact JSON (single line) to a writer.
///
/// The serve protocol is line-oriented, so serve events always use this.
pub fn emit_response_compact<T: Serialize>(
    response: &T,
    writer: &mut impl Write,
) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
