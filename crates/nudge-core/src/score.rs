//! Coefficient model: three independent penalty measures over an ordering.
//!
//! Each function scores a *candidate* ordering of declarations (slice index
//! = proposed position) and returns a value in `[0, 1]` where lower is
//! better:
//!
//! - `dependency_coefficient`: forward references, an earlier declaration
//!   mentioning a name a later declaration introduces.
//! - `similarity_coefficient`: how dissimilar adjacent names are, as the
//!   minimum Jaro–Winkler distance over adjacent pairs.
//! - `kind_coefficient`: how mixed the declaration kinds are across
//!   adjacent pairs.
//!
//! The functions are weight-agnostic; `Weights` and
//! `Coefficients::weighted_sum` combine them for the search layer. All
//! accept `&[Declaration]` or `&[&Declaration]` so the search can score
//! hypothetical orders without cloning records.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use crate::decl::Declaration;

/// Winkler prefix bonus per shared prefix character.
const WINKLER_SCALING: f64 = 0.1;
/// Jaro score above which the Winkler prefix bonus applies.
const WINKLER_BOOST_THRESHOLD: f64 = 0.7;
/// Maximum shared-prefix length counted by the Winkler bonus.
const WINKLER_MAX_PREFIX: usize = 4;

// ============================================================================
// Coefficients
// ============================================================================

/// The three penalty measures for one ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub dependency: f64,
    pub similarity: f64,
    pub kind: f64,
}

impl Coefficients {
    /// Measure all three coefficients for an ordering.
    pub fn measure<D: Borrow<Declaration>>(decls: &[D]) -> Self {
        Coefficients {
            dependency: dependency_coefficient(decls),
            similarity: similarity_coefficient(decls, 0.0),
            kind: kind_coefficient(decls, 0.0),
        }
    }

    /// Combine the three penalties into one score. Lower is better.
    pub fn weighted_sum(&self, weights: &Weights) -> f64 {
        weights.dependency * self.dependency
            + weights.similarity * self.similarity
            + weights.kind * self.kind
    }
}

/// Non-negative weights for combining the three coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub dependency: f64,
    pub similarity: f64,
    pub kind: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            dependency: 1.0,
            similarity: 1.0,
            kind: 1.0,
        }
    }
}

impl Weights {
    /// Create a weight triple.
    pub fn new(dependency: f64, similarity: f64, kind: f64) -> Self {
        Weights {
            dependency,
            similarity,
            kind,
        }
    }

    /// All weights finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.dependency, self.similarity, self.kind]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0)
    }
}

// ============================================================================
// Coefficient Functions
// ============================================================================

/// Dependency-ordering penalty.
///
/// For every ordered pair of positions `(i, j)` with `i < j`, one violation
/// is counted when declaration `i` references a name declaration `j`
/// introduces, meaning an earlier declaration depends on something defined
/// later. The result is violations divided by the number of declarations.
/// Lists with fewer than two declarations score 0.
pub fn dependency_coefficient<D: Borrow<Declaration>>(decls: &[D]) -> f64 {
    if decls.len() < 2 {
        return 0.0;
    }
    let mut violations = 0usize;
    for i in 0..decls.len() {
        for j in (i + 1)..decls.len() {
            if decls[i].borrow().references(decls[j].borrow()) {
                violations += 1;
            }
        }
    }
    violations as f64 / decls.len() as f64
}

/// Naming-similarity penalty.
///
/// The Jaro–Winkler distance (`1 − similarity`) of each adjacent pair's
/// primary names, aggregated as the minimum over all adjacent pairs: the
/// least dissimilar adjacent pair determines the score. Identical adjacent
/// names give 0; fully distinct single-token names give 1. Lists with
/// fewer than two declarations score 0.
///
/// The second argument is a reserved tuning parameter kept for interface
/// stability; it has no effect and callers pass 0.
pub fn similarity_coefficient<D: Borrow<Declaration>>(decls: &[D], _reserved: f64) -> f64 {
    if decls.len() < 2 {
        return 0.0;
    }
    decls
        .windows(2)
        .map(|pair| 1.0 - jaro_winkler(pair[0].borrow().name(), pair[1].borrow().name()))
        .fold(1.0, f64::min)
}

/// Kind-grouping penalty.
///
/// The fraction of adjacent pairs whose kinds differ: 0 when every
/// declaration shares one kind, 1 when every adjacent pair differs. Lists
/// with fewer than two declarations score 0.
///
/// The second argument is a reserved tuning parameter kept for interface
/// stability; it has no effect and callers pass 0.
pub fn kind_coefficient<D: Borrow<Declaration>>(decls: &[D], _reserved: f64) -> f64 {
    if decls.len() < 2 {
        return 0.0;
    }
    let differing = decls
        .windows(2)
        .filter(|pair| pair[0].borrow().kind != pair[1].borrow().kind)
        .count();
    differing as f64 / (decls.len() - 1) as f64
}

// ============================================================================
// Jaro–Winkler
// ============================================================================

/// Jaro similarity over char sequences, in `[0, 1]`.
fn jaro(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut b_matched = vec![false; b.len()];
    let mut matched_a = Vec::new();
    for (i, &ca) in a.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = (i + window + 1).min(b.len());
        for j in lo..hi {
            if !b_matched[j] && b[j] == ca {
                b_matched[j] = true;
                matched_a.push(ca);
                break;
            }
        }
    }
    if matched_a.is_empty() {
        return 0.0;
    }

    let matched_b: Vec<char> = b
        .iter()
        .zip(&b_matched)
        .filter(|(_, matched)| **matched)
        .map(|(&c, _)| c)
        .collect();
    let transposed = matched_a
        .iter()
        .zip(&matched_b)
        .filter(|(x, y)| x != y)
        .count();

    let m = matched_a.len() as f64;
    let t = transposed as f64 / 2.0;
    (m / a.len() as f64 + m / b.len() as f64 + (m - t) / m) / 3.0
}

/// Jaro–Winkler similarity: Jaro plus a shared-prefix bonus, applied only
/// above the boost threshold.
fn jaro_winkler(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let jaro_score = jaro(&a_chars, &b_chars);
    if jaro_score <= WINKLER_BOOST_THRESHOLD {
        return jaro_score;
    }
    let prefix = a_chars
        .iter()
        .zip(&b_chars)
        .take(WINKLER_MAX_PREFIX)
        .take_while(|(x, y)| x == y)
        .count();
    jaro_score + prefix as f64 * WINKLER_SCALING * (1.0 - jaro_score)
}

// ============================================================================
// Tests
// ============================================================================
