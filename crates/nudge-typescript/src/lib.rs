//! TypeScript and JavaScript declaration extraction.
//!
//! Bridges tree-sitter grammars to the parser-agnostic model in
//! `nudge-core`:
//!
//! - `classifier`: maps the grammars' node-kind vocabulary onto the eight
//!   declaration kinds
//! - `extract`: walks a parsed tree into declarations plus the lossless
//!   segment partition of the source text
//!
//! Grammar selection is by source flavor (`ts`, `tsx`, `js`, `jsx`),
//! derived from the file extension. TypeScript and TSX use separate
//! tree-sitter grammars; plain JavaScript and JSX share one.

pub mod classifier;
pub mod extract;

pub use classifier::TypeScriptClassifier;
pub use extract::{SourceFlavor, TypeScriptExtractor};
