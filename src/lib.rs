//! Nudge: declaration reordering advisor
//!
//! Scores the ordering of a file's top-level declarations on three axes
//! (dependency direction, name similarity, kind grouping), finds the best
//! single-declaration move that improves the score, and packages it as a
//! job an editor can accept or reject.

// Core model - re-exported from nudge-core
pub use nudge_core::advisor;
pub use nudge_core::classify;
pub use nudge_core::decl;
pub use nudge_core::error;
pub use nudge_core::job;
pub use nudge_core::pair_index;
pub use nudge_core::rebuild;
pub use nudge_core::score;
pub use nudge_core::search;
pub use nudge_core::text;
pub use nudge_core::types;

// Front doors
pub mod cli;
pub mod engine;
pub mod output;
pub mod serve;
