//! Generic bidirectional pair index.
//!
//! Relates two id spaces (here: file hashes and job ids) without a join
//! table. Both directions are first-class: rights-by-left and lefts-by-right
//! resolve in one map lookup, and a pair can be deleted from either side.
//!
//! Invariant: the two maps always describe the same pair set, and neither
//! map retains an empty bucket.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub struct PairIndex<L, R> {
    by_left: BTreeMap<L, BTreeSet<R>>,
    by_right: BTreeMap<R, BTreeSet<L>>,
}

impl<L, R> Default for PairIndex<L, R> {
    fn default() -> Self {
        Self {
            by_left: BTreeMap::new(),
            by_right: BTreeMap::new(),
        }
    }
}

impl<L, R> PairIndex<L, R>
where
    L: Ord + Clone,
    R: Ord + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair. Returns `false` when the pair was already present.
    pub fn insert(&mut self, left: L, right: R) -> bool {
        let fresh = self
            .by_left
            .entry(left.clone())
            .or_default()
            .insert(right.clone());
        if fresh {
            self.by_right.entry(right).or_default().insert(left);
        }
        fresh
    }

    /// Remove one pair. Returns `false` when the pair was not present.
    pub fn remove(&mut self, left: &L, right: &R) -> bool {
        let Some(rights) = self.by_left.get_mut(left) else {
            return false;
        };
        if !rights.remove(right) {
            return false;
        }
        if rights.is_empty() {
            self.by_left.remove(left);
        }
        if let Some(lefts) = self.by_right.get_mut(right) {
            lefts.remove(left);
            if lefts.is_empty() {
                self.by_right.remove(right);
            }
        }
        true
    }

    /// Remove every pair with this left id, returning the right ids that
    /// were paired with it.
    pub fn remove_left(&mut self, left: &L) -> BTreeSet<R> {
        let Some(rights) = self.by_left.remove(left) else {
            return BTreeSet::new();
        };
        for right in &rights {
            if let Some(lefts) = self.by_right.get_mut(right) {
                lefts.remove(left);
                if lefts.is_empty() {
                    self.by_right.remove(right);
                }
            }
        }
        rights
    }

    /// Remove every pair with this right id, returning the left ids that
    /// were paired with it.
    pub fn remove_right(&mut self, right: &R) -> BTreeSet<L> {
        let Some(lefts) = self.by_right.remove(right) else {
            return BTreeSet::new();
        };
        for left in &lefts {
            if let Some(rights) = self.by_left.get_mut(left) {
                rights.remove(right);
                if rights.is_empty() {
                    self.by_left.remove(left);
                }
            }
        }
        lefts
    }

    /// Right ids paired with `left`, in sorted order.
    pub fn rights(&self, left: &L) -> impl Iterator<Item = &R> {
        self.by_left.get(left).into_iter().flatten()
    }

    /// Left ids paired with `right`, in sorted order.
    pub fn lefts(&self, right: &R) -> impl Iterator<Item = &L> {
        self.by_right.get(right).into_iter().flatten()
    }

    pub fn contains(&self, left: &L, right: &R) -> bool {
        self.by_left
            .get(left)
            .is_some_and(|rights| rights.contains(right))
    }

    /// All pairs, ordered by left id then right id.
    pub fn iter(&self) -> impl Iterator<Item = (&L, &R)> {
        self.by_left
            .iter()
            .flat_map(|(left, rights)| rights.iter().map(move |right| (left, right)))
    }

    pub fn len(&self) -> usize {
        self.by_left.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_left.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
