//! Core model for nudge.
//!
//! This crate provides the language-agnostic half of the declaration
//! reordering advisor:
//! - Declaration and segment records produced by language extractors
//! - The classifier/extractor traits languages plug into
//! - Coefficient scoring (dependency order, name similarity, kind grouping)
//! - Solution search over single-declaration relocations
//! - Text and cursor-position rebuild for a chosen relocation
//! - Job identity, fingerprinting, and the job store
//! - A reusable bidirectional pair index
//! - Error types and error codes

pub mod advisor;
pub mod classify;
pub mod decl;
pub mod error;
pub mod job;
pub mod pair_index;
pub mod rebuild;
pub mod score;
pub mod search;
pub mod text;
pub mod types;
