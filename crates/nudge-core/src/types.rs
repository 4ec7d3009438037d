//! Shared primitive types: declaration kinds, spans, positions, content hashes.
//!
//! These types form the wire contract with the editor layer, so their serde
//! shapes are pinned by tests.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// DeclarationKind
// ============================================================================

/// The eight kinds a top-level declaration can classify as.
///
/// Serialized in camelCase to match the editor contract (`typeAlias`, not
/// `type_alias`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationKind {
    Class,
    Function,
    Interface,
    TypeAlias,
    Block,
    Variable,
    Enum,
    Unknown,
}

impl DeclarationKind {
    /// All kinds in their default preference order.
    pub const ALL: [DeclarationKind; 8] = [
        DeclarationKind::Class,
        DeclarationKind::Function,
        DeclarationKind::Interface,
        DeclarationKind::TypeAlias,
        DeclarationKind::Block,
        DeclarationKind::Variable,
        DeclarationKind::Enum,
        DeclarationKind::Unknown,
    ];

    /// The wire name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Function => "function",
            DeclarationKind::Interface => "interface",
            DeclarationKind::TypeAlias => "typeAlias",
            DeclarationKind::Block => "block",
            DeclarationKind::Variable => "variable",
            DeclarationKind::Enum => "enum",
            DeclarationKind::Unknown => "unknown",
        }
    }

    /// Parse a wire name back to a kind.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "class" => Some(DeclarationKind::Class),
            "function" => Some(DeclarationKind::Function),
            "interface" => Some(DeclarationKind::Interface),
            "typeAlias" => Some(DeclarationKind::TypeAlias),
            "block" => Some(DeclarationKind::Block),
            "variable" => Some(DeclarationKind::Variable),
            "enum" => Some(DeclarationKind::Enum),
            "unknown" => Some(DeclarationKind::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ContentHash
// ============================================================================

/// SHA-256 content hash, hex-encoded.
///
/// Used for declaration ids, declaration-set fingerprints, and the pair
/// index keys that relate jobs to files.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Compute the hash of a text.
    pub fn compute(text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        ContentHash(hex::encode(hasher.finalize()))
    }

    /// The full hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A short 12-character prefix, for display and synthetic names.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Span
// ============================================================================

/// A half-open byte range `[start, end)` in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "span start {} exceeds end {}", start, end);
        Span { start, end }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether a byte offset falls inside the span.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Position and Range
// ============================================================================

/// A cursor position: 0-indexed line and 0-indexed column counted in
/// characters (not bytes).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

impl Position {
    /// Create a new position.
    pub fn new(line: u32, col: u32) -> Self {
        Position { line, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A position range `[start, end]` in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Create a new range.
    pub fn new(start: Position, end: Position) -> Self {
        Range { start, end }
    }
}

// ============================================================================
// Tests
// ============================================================================
