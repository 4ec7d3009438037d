//! Text and cursor-position rebuild for a chosen relocation.
//!
//! The segment sequence is the sole source of truth: declaration-owned
//! segments are permuted across the declaration slots while separator
//! segments stay pinned in place, and every fragment is reproduced
//! verbatim. Because the result is a permutation of the same fragments,
//! total length and newline count are unchanged, which is why the proposed
//! replacement range can always cover the whole document.

use serde::{Deserialize, Serialize};

use crate::decl::Segment;
use crate::error::NudgeError;
use crate::search::validate_move;
use crate::text;
use crate::types::{Position, Range};

/// The rebuilt document for one relocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rebuilt {
    /// Full new file text.
    pub text: String,
    /// The range to replace: always the entire original document, since a
    /// relocation can shift every subsequent line. Callers diff-apply if
    /// they want a minimal edit.
    pub range: Range,
    /// Cursor position after the move: the relocated declaration's new
    /// start plus `cursor_delta`.
    pub position: Position,
}

/// Apply a relocation to the segment sequence.
///
/// `cursor_delta` is the byte offset of the cursor from the start of the
/// declaration it currently sits inside (0 when the cursor is elsewhere);
/// the moved text is identical, so the delta lands on the same character
/// after the move. `line_separator` must match the document's end-of-line
/// convention for the returned positions to be meaningful.
pub fn rebuild(
    segments: &[Segment],
    old_index: usize,
    new_index: usize,
    line_separator: &str,
    cursor_delta: usize,
) -> Result<Rebuilt, NudgeError> {
    let slot_count = segments.iter().filter(|s| s.owner.is_some()).count();
    validate_move(slot_count, old_index, new_index)?;

    let mut declaration_segments: Vec<&Segment> =
        segments.iter().filter(|s| s.owner.is_some()).collect();
    let moved = declaration_segments.remove(old_index);
    declaration_segments.insert(new_index, moved);

    let capacity = segments.iter().map(|s| s.text.len()).sum();
    let mut out = String::with_capacity(capacity);
    let mut slot = 0usize;
    let mut moved_start = 0usize;
    for segment in segments {
        if segment.owner.is_some() {
            if slot == new_index {
                moved_start = out.len();
            }
            out.push_str(&declaration_segments[slot].text);
            slot += 1;
        } else {
            out.push_str(&segment.text);
        }
    }

    let position = text::position_at(&out, moved_start + cursor_delta, line_separator);
    let range = Range::new(
        Position::new(0, 0),
        text::end_position(&out, line_separator),
    );

    Ok(Rebuilt {
        text: out,
        range,
        position,
    })
}

// ============================================================================
// Tests
// ============================================================================
