//! Language seam: the classifier and extractor traits.
//!
//! The model, scoring, and search layers never see a parser's node-kind
//! vocabulary. A language crate implements `DeclarationClassifier` (a pure
//! mapping from native node-kind strings onto the eight-kind enum) and
//! `Extractor` (full text in, `Extraction` out). Adding a language means
//! adding those two implementations; nothing above this seam changes.

use crate::decl::Extraction;
use crate::types::DeclarationKind;

/// Maps a grammar's native node-kind vocabulary onto declaration kinds.
///
/// Implementations are stateless lookup tables. The extractor drives the
/// syntax tree; the classifier only answers vocabulary questions, so it can
/// be shared between closely related grammars (TypeScript and TSX, for
/// example).
pub trait DeclarationClassifier {
    /// Short language name, for logging.
    fn language(&self) -> &'static str;

    /// Classify a native node kind as one of the eight declaration kinds,
    /// or `None` when the node is not a reorderable declaration.
    fn classify(&self, node_kind: &str) -> Option<DeclarationKind>;

    /// Whether a node kind is a transparent wrapper whose single wrapped
    /// declaration should be classified instead (`export_statement`).
    fn is_transparent(&self, node_kind: &str) -> bool;

    /// Whether a node kind is an identifier leaf. Every identifier leaf in
    /// a declaration's subtree is a candidate child identifier.
    fn is_identifier_leaf(&self, node_kind: &str) -> bool;

    /// Whether a node kind binds one name through its `name` field
    /// (`variable_declarator`); used to collect the names a variable
    /// statement introduces.
    fn is_declarator(&self, node_kind: &str) -> bool;
}

/// Turns raw file text into an extraction.
///
/// Extraction is infallible by contract: input that cannot be parsed yields
/// an empty declaration list with the whole text preserved as a separator
/// segment, so downstream stages naturally produce no solutions.
pub trait Extractor {
    /// Short language name, for logging.
    fn language(&self) -> &'static str;

    /// Extract declarations and the segment partition from `text`.
    fn extract(&self, text: &str) -> Extraction;
}
