//! Declaration extraction from TypeScript/JavaScript source text.
//!
//! The extractor parses a file with the flavor's tree-sitter grammar and
//! walks the top-level statements. Statements that classify as one of the
//! eight declaration kinds become `Declaration`s; everything else (imports,
//! stray calls, parse errors) folds into separator segments. Comments and
//! blank lines above a declaration are absorbed into its span so they
//! travel with it when it moves. A declaration whose lines are shared with
//! a construct continuing past them stays in separator text: only whole,
//! line-separable declarations move.
//!
//! Extraction is infallible: text the grammar cannot make sense of yields
//! fewer (or zero) declarations, never an error, and the segment sequence
//! always reproduces the input byte for byte.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, warn};
use tree_sitter::{Language, Node, Parser};

use nudge_core::classify::{DeclarationClassifier, Extractor};
use nudge_core::decl::{Declaration, Extraction, Segment};
use nudge_core::types::{ContentHash, DeclarationKind, Span};

use crate::classifier::TypeScriptClassifier;

// ============================================================================
// Source Flavor
// ============================================================================

/// Grammar selector, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFlavor {
    Ts,
    Tsx,
    Js,
    Jsx,
}

impl SourceFlavor {
    /// Map a file extension (without the dot) to a flavor.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "ts" | "mts" | "cts" => Some(SourceFlavor::Ts),
            "tsx" => Some(SourceFlavor::Tsx),
            "js" | "mjs" | "cjs" => Some(SourceFlavor::Js),
            "jsx" => Some(SourceFlavor::Jsx),
            _ => None,
        }
    }

    /// Flavor for a file path, by extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFlavor::Ts => "ts",
            SourceFlavor::Tsx => "tsx",
            SourceFlavor::Js => "js",
            SourceFlavor::Jsx => "jsx",
        }
    }

    /// The tree-sitter grammar for this flavor. TypeScript and TSX are
    /// separate grammars; JS and JSX share one.
    fn grammar(&self) -> Language {
        match self {
            SourceFlavor::Ts => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceFlavor::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            SourceFlavor::Js | SourceFlavor::Jsx => tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

impl std::fmt::Display for SourceFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Extractor
// ============================================================================

/// Declaration extractor for one source flavor.
///
/// A fresh tree-sitter parser is created per call; parsers are cheap
/// relative to a parse and this keeps `extract` free of interior
/// mutability.
#[derive(Debug, Clone, Copy)]
pub struct TypeScriptExtractor {
    flavor: SourceFlavor,
    classifier: TypeScriptClassifier,
}

impl TypeScriptExtractor {
    pub fn new(flavor: SourceFlavor) -> Self {
        TypeScriptExtractor {
            flavor,
            classifier: TypeScriptClassifier,
        }
    }

    pub fn flavor(&self) -> SourceFlavor {
        self.flavor
    }
}

impl Extractor for TypeScriptExtractor {
    fn language(&self) -> &'static str {
        self.flavor.as_str()
    }

    fn extract(&self, text: &str) -> Extraction {
        let mut parser = Parser::new();
        if parser.set_language(&self.flavor.grammar()).is_err() {
            warn!(
                flavor = self.flavor.as_str(),
                "grammar rejected by tree-sitter runtime"
            );
            return Extraction::unparsed(text);
        }
        let Some(tree) = parser.parse(text, None) else {
            debug!(flavor = self.flavor.as_str(), "parse produced no tree");
            return Extraction::unparsed(text);
        };

        let extraction = build_extraction(&self.classifier, text, tree.root_node());
        debug!(
            flavor = self.flavor.as_str(),
            declarations = extraction.declarations.len(),
            segments = extraction.segments.len(),
            "extracted source file"
        );
        extraction
    }
}

// ============================================================================
// Tree Walk
// ============================================================================

fn build_extraction(
    classifier: &TypeScriptClassifier,
    source: &str,
    root: Node<'_>,
) -> Extraction {
    let mut declarations: Vec<Declaration> = Vec::new();
    let mut segments: Vec<Segment> = Vec::new();
    // Bytes already flushed into segments.
    let mut emitted = 0usize;
    // End of the last skipped non-trivia statement. Text before the barrier
    // becomes separator content; text after it is leading trivia of the
    // next declaration.
    let mut barrier = 0usize;

    let mut cursor = root.walk();
    let statements: Vec<Node<'_>> = root.named_children(&mut cursor).collect();
    for (position, &node) in statements.iter().enumerate() {
        let Some((kind, inner)) = resolve_declaration(classifier, node) else {
            if node.kind() != "comment" {
                barrier = barrier.max(line_end(source, node.end_byte()));
            }
            continue;
        };

        // Segments are whole-line chunks: a declaration runs from its first
        // line's column 0 (or the end of the previous declaration, which
        // absorbs comments and blank lines above it) through the end of its
        // last line, newline included. Whole-line segments keep any
        // permutation syntactically intact.
        let start = if declarations.is_empty() {
            line_start(source, node.start_byte()).max(barrier)
        } else {
            emitted.max(barrier)
        };
        let end = line_end(source, node.end_byte());
        if end <= start {
            // Shares a line with already-emitted text; leave it there.
            continue;
        }
        if line_start(source, node.start_byte()) < start {
            // The header line is already inside the previous segment or a
            // skipped statement's lines; the remainder below it must not
            // move on its own.
            barrier = barrier.max(entangled_end(source, &statements[position + 1..], end));
            continue;
        }
        let extent = entangled_end(source, &statements[position + 1..], end);
        if extent > end {
            // A later construct starts on this declaration's last line and
            // continues past it; no line boundary separates the two.
            barrier = barrier.max(extent);
            continue;
        }
        if start > emitted {
            segments.push(Segment::separator(&source[emitted..start]));
        }
        let index = declarations.len();
        let span_text = &source[start..end];
        segments.push(Segment::declaration(span_text, index));

        let identifiers = declared_names(classifier, kind, inner, node, source);
        let mut children = BTreeSet::new();
        collect_identifier_leaves(classifier, node, source, &mut children);
        declarations.push(Declaration::new(
            kind,
            Span::new(start, end),
            span_text,
            identifiers,
            children,
        ));
        emitted = end;
    }

    if emitted < source.len() {
        segments.push(Segment::separator(&source[emitted..]));
    }

    Extraction {
        declarations,
        segments,
    }
}

/// Classify a top-level statement, looking through `export` wrappers.
///
/// Returns the declaration kind and the node that carries the name (the
/// wrapped declaration for exports). The caller keeps using the outer node
/// for span bookkeeping so the `export` keyword moves with the declaration.
fn resolve_declaration<'tree>(
    classifier: &TypeScriptClassifier,
    node: Node<'tree>,
) -> Option<(DeclarationKind, Node<'tree>)> {
    if let Some(kind) = classifier.classify(node.kind()) {
        return Some((kind, node));
    }
    if classifier.is_transparent(node.kind()) {
        // `export { a }` re-exports and `export default <expr>` carry no
        // declaration field and stay separator content.
        let inner = node.child_by_field_name("declaration")?;
        let kind = classifier.classify(inner.kind())?;
        return Some((kind, inner));
    }
    None
}

/// Names a declaration introduces, primary name first.
fn declared_names(
    classifier: &TypeScriptClassifier,
    kind: DeclarationKind,
    inner: Node<'_>,
    outer: Node<'_>,
    source: &str,
) -> Vec<String> {
    match kind {
        // A bare block has no name of its own.
        DeclarationKind::Block => {}
        DeclarationKind::Variable | DeclarationKind::Unknown => {
            if let Some(name) = inner.child_by_field_name("name") {
                let text = node_text(name, source);
                if !text.is_empty() {
                    return vec![text.to_string()];
                }
            }
            let mut names = Vec::new();
            collect_declarator_names(classifier, inner, source, &mut names);
            if !names.is_empty() {
                return names;
            }
        }
        _ => {
            if let Some(name) = inner.child_by_field_name("name") {
                let text = node_text(name, source);
                if !text.is_empty() {
                    return vec![text.to_string()];
                }
            }
        }
    }
    vec![synthetic_name(node_text(outer, source))]
}

/// Collect the bound names of every `variable_declarator` under `node`,
/// without descending into initializer expressions.
fn collect_declarator_names(
    classifier: &TypeScriptClassifier,
    node: Node<'_>,
    source: &str,
    out: &mut Vec<String>,
) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if classifier.is_declarator(child.kind()) {
            if let Some(pattern) = child.child_by_field_name("name") {
                collect_binding_names(classifier, pattern, source, out);
            }
            continue;
        }
        collect_declarator_names(classifier, child, source, out);
    }
}

/// Collect identifier leaves of a binding pattern: a plain identifier, or
/// every identifier inside a destructuring pattern.
fn collect_binding_names(
    classifier: &TypeScriptClassifier,
    node: Node<'_>,
    source: &str,
    out: &mut Vec<String>,
) {
    if node.named_child_count() == 0 {
        if classifier.is_identifier_leaf(node.kind()) {
            let text = node_text(node, source);
            if !text.is_empty() && !out.iter().any(|name| name == text) {
                out.push(text.to_string());
            }
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_binding_names(classifier, child, source, out);
    }
}

/// Collect every identifier leaf in a declaration's subtree. The caller
/// subtracts the declaration's own names afterwards.
fn collect_identifier_leaves(
    classifier: &TypeScriptClassifier,
    node: Node<'_>,
    source: &str,
    out: &mut BTreeSet<String>,
) {
    if node.named_child_count() == 0 {
        if classifier.is_identifier_leaf(node.kind()) {
            let text = node_text(node, source);
            if !text.is_empty() {
                out.insert(text.to_string());
            }
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_identifier_leaves(classifier, child, source, out);
    }
}

fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Content-hash stand-in for declarations that introduce no name (bare
/// blocks, anonymous exports), so they still participate in dependency and
/// similarity scoring.
fn synthetic_name(text: &str) -> String {
    format!("block_{}", ContentHash::compute(text).short())
}

/// Byte offset of column 0 of the line containing `offset`.
fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map(|nl| nl + 1).unwrap_or(0)
}

/// Byte offset just past the newline ending the line that contains
/// `offset`, or the end of the source for a final line without one.
fn line_end(source: &str, offset: usize) -> usize {
    source[offset..]
        .find('\n')
        .map(|nl| offset + nl + 1)
        .unwrap_or(source.len())
}

/// Extend `end` through the last line of every following statement that
/// starts before the running extent. A result past the initial `end` means
/// the last line is shared with a construct that continues beyond it, so
/// none of those lines can move as a unit.
fn entangled_end(source: &str, rest: &[Node<'_>], mut end: usize) -> usize {
    for sibling in rest {
        if sibling.start_byte() >= end {
            break;
        }
        end = end.max(line_end(source, sibling.end_byte()));
    }
    end
}

// ============================================================================
// Tests
// ============================================================================
