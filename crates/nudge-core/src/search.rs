//! Solution search: enumerate and rank single-declaration relocations.
//!
//! For every declaration and every other position, the search builds the
//! hypothetical order (remove, reinsert), measures the coefficient triple,
//! and keeps the move only if its weighted score strictly beats the current
//! order. Results are ranked best-first: lowest score, then smallest index
//! displacement, then enumeration order.

use serde::{Deserialize, Serialize};

use crate::decl::Declaration;
use crate::error::NudgeError;
use crate::score::{Coefficients, Weights};

/// Minimum score reduction for a move to count as improving. Guards the
/// strict comparison against float summation noise.
const SCORE_EPSILON: f64 = 1e-9;

// ============================================================================
// Solution
// ============================================================================

/// The axis a solution improves most, in weighted terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveReason {
    OrderedDependencies,
    NameSimilarity,
    SameKindBlocks,
}

impl std::fmt::Display for MoveReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phrase = match self {
            MoveReason::OrderedDependencies => "more ordered dependencies",
            MoveReason::NameSimilarity => "more name similarity",
            MoveReason::SameKindBlocks => "more same-type blocks",
        };
        write!(f, "{}", phrase)
    }
}

/// One improving relocation: take the declaration at `old_index` out and
/// reinsert it so it ends up at `new_index`. The coefficient triple and
/// score describe the *resulting* order. The declaration list itself stays
/// with the caller; `reordered` materializes the hypothetical order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub old_index: usize,
    pub new_index: usize,
    pub coefficients: Coefficients,
    pub score: f64,
    pub reason: MoveReason,
}

impl Solution {
    /// Absolute index displacement of the move.
    pub fn displacement(&self) -> usize {
        self.old_index.abs_diff(self.new_index)
    }

    /// The declaration order this solution produces.
    pub fn reordered<'a>(&self, decls: &'a [Declaration]) -> Vec<&'a Declaration> {
        reordered_refs(decls, self.old_index, self.new_index)
    }
}

// ============================================================================
// Search
// ============================================================================

/// Enumerate all improving single-declaration relocations, best first.
///
/// Returns an empty list when there are fewer than two declarations or no
/// relocation strictly lowers the weighted score.
pub fn find_solutions(decls: &[Declaration], weights: &Weights) -> Vec<Solution> {
    if decls.len() < 2 {
        return Vec::new();
    }

    let current: Vec<&Declaration> = decls.iter().collect();
    let baseline = Coefficients::measure(&current);
    let current_score = baseline.weighted_sum(weights);

    let mut solutions = Vec::new();
    for old_index in 0..decls.len() {
        for new_index in 0..decls.len() {
            if new_index == old_index {
                continue;
            }
            let candidate = reordered_refs(decls, old_index, new_index);
            let coefficients = Coefficients::measure(&candidate);
            let score = coefficients.weighted_sum(weights);
            if current_score - score > SCORE_EPSILON {
                solutions.push(Solution {
                    old_index,
                    new_index,
                    coefficients,
                    score,
                    reason: dominant_reason(&baseline, &coefficients, weights),
                });
            }
        }
    }

    // Stable sort keeps enumeration order for full ties.
    solutions.sort_by(|a, b| {
        a.score
            .total_cmp(&b.score)
            .then_with(|| a.displacement().cmp(&b.displacement()))
    });
    solutions
}

/// The single top-ranked improving relocation, if any.
pub fn best_solution(decls: &[Declaration], weights: &Weights) -> Option<Solution> {
    find_solutions(decls, weights).into_iter().next()
}

/// Validate externally supplied move indices against a declaration count.
///
/// The search never produces an invalid move, but moves reconstructed from
/// stored jobs must be checked before any text surgery.
pub fn validate_move(len: usize, old_index: usize, new_index: usize) -> Result<(), NudgeError> {
    if old_index >= len {
        return Err(NudgeError::move_out_of_range(old_index, len));
    }
    if new_index >= len {
        return Err(NudgeError::move_out_of_range(new_index, len));
    }
    if old_index == new_index {
        return Err(NudgeError::invalid_args(
            "declaration move must change the index",
        ));
    }
    Ok(())
}

fn reordered_refs<'a>(
    decls: &'a [Declaration],
    old_index: usize,
    new_index: usize,
) -> Vec<&'a Declaration> {
    let mut order: Vec<&Declaration> = decls.iter().collect();
    let moved = order.remove(old_index);
    order.insert(new_index, moved);
    order
}

/// Pick the axis with the largest weighted reduction. Ties resolve in
/// dependency, similarity, kind order.
fn dominant_reason(before: &Coefficients, after: &Coefficients, weights: &Weights) -> MoveReason {
    let dependency = weights.dependency * (before.dependency - after.dependency);
    let similarity = weights.similarity * (before.similarity - after.similarity);
    let kind = weights.kind * (before.kind - after.kind);
    if dependency >= similarity && dependency >= kind {
        MoveReason::OrderedDependencies
    } else if similarity >= kind {
        MoveReason::NameSimilarity
    } else {
        MoveReason::SameKindBlocks
    }
}

// ============================================================================
// Tests
// ============================================================================
