//! Text position utilities for byte offset and line:column conversions.
//!
//! All conversions take the line separator explicitly (`"\n"` or `"\r\n"`)
//! because the rebuilt cursor position must agree with whatever separator
//! the hosting editor reports for the document; mixing separators between
//! extraction and rebuild would shift every computed line.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **0-indexed** (editor protocol convention)
//! - Columns count Unicode scalar values (chars), not bytes
//! - Byte offsets are 0-indexed and clamped to the content length

use crate::types::Position;

/// Detect the line separator used by a text.
///
/// Returns `"\r\n"` when the text contains at least one CRLF, `"\n"`
/// otherwise. Mixed files follow the CRLF convention, which matches how
/// editors report a single end-of-line setting per document.
pub fn detect_line_separator(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Convert a byte offset to a 0-indexed line/column position.
///
/// Columns count chars since the end of the last separator. Offsets beyond
/// the text, or inside a multi-byte character, are clamped down to the
/// nearest valid boundary.
pub fn position_at(text: &str, offset: usize, separator: &str) -> Position {
    let mut offset = offset.min(text.len());
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }

    let mut line = 0u32;
    let mut line_start = 0usize;
    for (idx, _) in text.match_indices(separator) {
        let after = idx + separator.len();
        if after > offset {
            break;
        }
        line += 1;
        line_start = after;
    }

    let col = text[line_start..offset].chars().count() as u32;
    Position::new(line, col)
}

/// Convert a 0-indexed line/column position to a byte offset.
///
/// Columns beyond the end of their line clamp to the line end; lines beyond
/// the end of the text clamp to the text length.
pub fn offset_at(text: &str, position: Position, separator: &str) -> usize {
    let mut line_start = 0usize;
    let mut line = 0u32;
    while line < position.line {
        match text[line_start..].find(separator) {
            Some(rel) => {
                line_start += rel + separator.len();
                line += 1;
            }
            None => return text.len(),
        }
    }

    let line_end = text[line_start..]
        .find(separator)
        .map(|rel| line_start + rel)
        .unwrap_or(text.len());

    let mut offset = line_start;
    let mut remaining = position.col;
    for ch in text[line_start..line_end].chars() {
        if remaining == 0 {
            break;
        }
        offset += ch.len_utf8();
        remaining -= 1;
    }
    offset
}

/// The position just past the last character of the text.
pub fn end_position(text: &str, separator: &str) -> Position {
    position_at(text, text.len(), separator)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod separator_detection {
        use super::*;

        #[test]
        fn lf_by_default() {
            assert_eq!(detect_line_separator("a\nb"), "\n");
            assert_eq!(detect_line_separator(""), "\n");
        }

        #[test]
        fn crlf_when_present() {
            assert_eq!(detect_line_separator("a\r\nb"), "\r\n");
            assert_eq!(detect_line_separator("a\nb\r\nc"), "\r\n");
        }
    }

    mod position_at_tests {
        use super::*;

        #[test]
        fn start_of_text() {
            assert_eq!(position_at("abc\ndef", 0, "\n"), Position::new(0, 0));
        }

        #[test]
        fn within_first_line() {
            assert_eq!(position_at("abc\ndef", 2, "\n"), Position::new(0, 2));
        }

        #[test]
        fn start_of_second_line() {
            assert_eq!(position_at("abc\ndef", 4, "\n"), Position::new(1, 0));
        }

        #[test]
        fn end_of_text() {
            assert_eq!(position_at("abc\ndef", 7, "\n"), Position::new(1, 3));
        }

        #[test]
        fn offset_past_end_clamps() {
            assert_eq!(position_at("abc", 99, "\n"), Position::new(0, 3));
        }

        #[test]
        fn crlf_lines() {
            let text = "abc\r\ndef\r\n";
            assert_eq!(position_at(text, 5, "\r\n"), Position::new(1, 0));
            assert_eq!(position_at(text, 8, "\r\n"), Position::new(1, 3));
            assert_eq!(position_at(text, 10, "\r\n"), Position::new(2, 0));
        }

        #[test]
        fn multibyte_columns_count_chars() {
            // "é" is two bytes; the column after it is 1, not 2.
            let text = "é\né";
            assert_eq!(position_at(text, 2, "\n"), Position::new(0, 1));
            assert_eq!(position_at(text, 5, "\n"), Position::new(1, 1));
        }

        #[test]
        fn offset_inside_multibyte_char_rounds_down() {
            let text = "é";
            assert_eq!(position_at(text, 1, "\n"), Position::new(0, 0));
        }
    }

    mod offset_at_tests {
        use super::*;

        #[test]
        fn maps_line_and_column() {
            let text = "abc\ndef\nghi";
            assert_eq!(offset_at(text, Position::new(0, 0), "\n"), 0);
            assert_eq!(offset_at(text, Position::new(1, 1), "\n"), 5);
            assert_eq!(offset_at(text, Position::new(2, 3), "\n"), 11);
        }

        #[test]
        fn column_clamps_to_line_end() {
            let text = "abc\ndef";
            assert_eq!(offset_at(text, Position::new(0, 99), "\n"), 3);
        }

        #[test]
        fn line_past_end_clamps_to_len() {
            let text = "abc\ndef";
            assert_eq!(offset_at(text, Position::new(9, 0), "\n"), text.len());
        }

        #[test]
        fn crlf_columns() {
            let text = "abc\r\ndef";
            assert_eq!(offset_at(text, Position::new(1, 2), "\r\n"), 7);
        }

        #[test]
        fn multibyte_column_consumes_full_char() {
            let text = "éx";
            assert_eq!(offset_at(text, Position::new(0, 1), "\n"), 2);
            assert_eq!(offset_at(text, Position::new(0, 2), "\n"), 3);
        }
    }

    mod roundtrip {
        use super::*;

        #[test]
        fn offset_position_offset_identity() {
            let text = "const a = 1;\nfunction f() {\n  return a;\n}\n";
            for offset in 0..=text.len() {
                let pos = position_at(text, offset, "\n");
                assert_eq!(offset_at(text, pos, "\n"), offset);
            }
        }

        #[test]
        fn crlf_roundtrip_on_boundaries() {
            let text = "a\r\nbb\r\nccc";
            for offset in [0, 1, 3, 4, 5, 7, 10] {
                let pos = position_at(text, offset, "\r\n");
                assert_eq!(offset_at(text, pos, "\r\n"), offset);
            }
        }

        #[test]
        fn end_position_matches_len() {
            let text = "one\ntwo\n";
            assert_eq!(end_position(text, "\n"), Position::new(2, 0));
            assert_eq!(end_position("", "\n"), Position::new(0, 0));
        }
    }
}
