//! Declaration and segment records produced by language extractors.
//!
//! A file extraction has two parallel views:
//!
//! - `Declaration`: the unit of reordering. Carries the kind, content-hash
//!   id, span, and the identifier sets used for dependency and similarity
//!   scoring.
//! - `Segment`: the unit of reconstruction. The file text split into an
//!   ordered sequence of fragments, each either owned by one declaration or
//!   a separator with no owner. Concatenating all segments reproduces the
//!   file exactly; that invariant is what makes rebuild lossless.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{ContentHash, DeclarationKind, Span};

// ============================================================================
// Declaration
// ============================================================================

/// One top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Classified kind.
    pub kind: DeclarationKind,
    /// Content hash of the declaration's exact span text. Stable across
    /// unrelated edits elsewhere in the file.
    pub id: ContentHash,
    /// Half-open byte range in the source, leading trivia included.
    pub span: Span,
    /// Names this declaration introduces, primary name first. For a block
    /// this is a synthetic content-hash name; for a variable statement, all
    /// declared names.
    pub identifiers: Vec<String>,
    /// Free identifiers referenced anywhere inside the declaration, minus
    /// `identifiers`.
    pub child_identifiers: BTreeSet<String>,
}

impl Declaration {
    /// Create a declaration from its span text and identifier sets.
    ///
    /// The id is computed from `text`; own names are removed from
    /// `child_identifiers` so self-references never count as dependencies.
    pub fn new(
        kind: DeclarationKind,
        span: Span,
        text: &str,
        identifiers: Vec<String>,
        mut child_identifiers: BTreeSet<String>,
    ) -> Self {
        for name in &identifiers {
            child_identifiers.remove(name.as_str());
        }
        Declaration {
            kind,
            id: ContentHash::compute(text),
            span,
            identifiers,
            child_identifiers,
        }
    }

    /// The primary identifier, used for similarity scoring and titles.
    pub fn name(&self) -> &str {
        self.identifiers.first().map(String::as_str).unwrap_or("")
    }

    /// Whether this declaration references any name `other` introduces.
    pub fn references(&self, other: &Declaration) -> bool {
        other
            .identifiers
            .iter()
            .any(|name| self.child_identifiers.contains(name.as_str()))
    }
}

// ============================================================================
// Segment
// ============================================================================

/// A literal fragment of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// The fragment text, verbatim.
    pub text: String,
    /// Index of the owning declaration, or `None` for separator trivia.
    pub owner: Option<usize>,
}

impl Segment {
    /// Create a separator segment (no owning declaration).
    pub fn separator(text: impl Into<String>) -> Self {
        Segment {
            text: text.into(),
            owner: None,
        }
    }

    /// Create a declaration-owned segment.
    pub fn declaration(text: impl Into<String>, index: usize) -> Self {
        Segment {
            text: text.into(),
            owner: Some(index),
        }
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// The result of extracting one file: declarations in source order plus the
/// segment partition of the entire text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub declarations: Vec<Declaration>,
    pub segments: Vec<Segment>,
}

impl Extraction {
    /// An extraction for text that produced no declarations (unparseable
    /// input, or nothing at top level worth reordering). The whole text
    /// becomes a single separator segment so reconstruction stays lossless.
    pub fn unparsed(text: impl Into<String>) -> Self {
        Extraction {
            declarations: Vec::new(),
            segments: vec![Segment::separator(text)],
        }
    }

    /// Concatenate all segments back into file text.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.segments.iter().map(|s| s.text.len()).sum());
        for segment in &self.segments {
            out.push_str(&segment.text);
        }
        out
    }

    /// Whether the segment partition reproduces `source` exactly, with one
    /// segment per declaration index in increasing order.
    pub fn is_lossless(&self, source: &str) -> bool {
        let owners: Vec<usize> = self
            .segments
            .iter()
            .filter_map(|segment| segment.owner)
            .collect();
        let expected: Vec<usize> = (0..self.declarations.len()).collect();
        owners == expected && self.text() == source
    }
}

// ============================================================================
// Tests
// ============================================================================
