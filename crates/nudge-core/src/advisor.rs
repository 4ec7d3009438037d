//! The advisor pipeline: extract, search, rebuild, wrap as a job.
//!
//! This is the one entry point the editor layer calls per file state. It is
//! synchronous and pure apart from the job timestamp; debouncing of
//! file-change bursts and job storage belong to the caller.

use tracing::debug;

use crate::classify::Extractor;
use crate::error::NudgeError;
use crate::job::{self, Fingerprint, Job, JobId, JobKind};
use crate::rebuild;
use crate::score::Weights;
use crate::search;
use crate::text;
use crate::types::{DeclarationKind, Position};

/// Advisor configuration, as supplied by the editor layer.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    /// Weights for the three coefficient axes.
    pub weights: Weights,
    /// Ordered kind preference. Accepted for forward compatibility with
    /// kind-grouping policies; the current coefficient model does not
    /// consult it.
    pub kind_order: Vec<DeclarationKind>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        AdvisorConfig {
            weights: Weights::default(),
            kind_order: DeclarationKind::ALL.to_vec(),
        }
    }
}

/// One advisory request: a file snapshot plus the cursor inside it.
#[derive(Debug, Clone, Copy)]
pub struct AdviseRequest<'a> {
    pub file_path: &'a str,
    pub file_text: &'a str,
    pub cursor: Position,
}

/// Run the full pipeline for one file snapshot.
///
/// Returns at most one job: the top-ranked improving relocation, with
/// rebuilt text and the cursor mapped across the move. `None` means the
/// file is already in its best order (or has fewer than two declarations,
/// or could not be parsed).
pub fn advise(
    extractor: &dyn Extractor,
    request: &AdviseRequest<'_>,
    config: &AdvisorConfig,
) -> Result<Option<Job>, NudgeError> {
    if !config.weights.is_valid() {
        return Err(NudgeError::invalid_args(
            "coefficient weights must be finite and non-negative",
        ));
    }

    let extraction = extractor.extract(request.file_text);
    debug!(
        language = extractor.language(),
        file = request.file_path,
        declarations = extraction.declarations.len(),
        segments = extraction.segments.len(),
        "extracted declarations"
    );
    if extraction.declarations.len() < 2 {
        return Ok(None);
    }
    if !extraction.is_lossless(request.file_text) {
        // A lossy partition would corrupt the file on accept.
        return Err(NudgeError::internal(format!(
            "extraction does not reproduce {} byte for byte",
            request.file_path
        )));
    }

    let solutions = search::find_solutions(&extraction.declarations, &config.weights);
    debug!(
        file = request.file_path,
        improving = solutions.len(),
        "ranked relocation candidates"
    );
    let Some(best) = solutions.into_iter().next() else {
        return Ok(None);
    };

    let separator = text::detect_line_separator(request.file_text);
    let cursor_offset = text::offset_at(request.file_text, request.cursor, separator);
    let moved = &extraction.declarations[best.old_index];
    let cursor_delta = if moved.span.contains(cursor_offset) {
        cursor_offset - moved.span.start
    } else {
        0
    };

    let rebuilt = rebuild::rebuild(
        &extraction.segments,
        best.old_index,
        best.new_index,
        separator,
        cursor_delta,
    )?;

    let direction = if best.new_index < best.old_index {
        "earlier"
    } else {
        "later"
    };
    let title = format!("Move '{}' {} ({})", moved.name(), direction, best.reason);
    let fingerprint = Fingerprint::of_declarations(&extraction.declarations);
    let id = JobId::compute(request.file_path, &fingerprint);
    debug!(job = %id, title = %title, score = best.score, "built reorder job");

    Ok(Some(Job {
        id,
        kind: JobKind::Reorder,
        file: request.file_path.to_string(),
        fingerprint,
        title,
        range: rebuilt.range,
        text: rebuilt.text,
        position: rebuilt.position,
        old_index: best.old_index,
        new_index: best.new_index,
        coefficients: best.coefficients,
        reason: best.reason,
        created_at: job::now_timestamp(),
    }))
}

// ============================================================================
// Tests
// ============================================================================
