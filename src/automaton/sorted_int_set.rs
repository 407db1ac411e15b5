//! Reference-counted state-id set used by subset construction.
//!
//! While sweeping interval boundaries, each NFA transition that opens
//! increments its destination and each one that closes decrements it. The
//! ids with a nonzero count form the DFA state being built. Small sets stay
//! in parallel sorted arrays; past `TREE_MAP_CUTOVER` distinct ids the set
//! moves into a `BTreeMap` and moves back once it empties.

use std::borrow::Borrow;
use std::collections::BTreeMap;

const TREE_MAP_CUTOVER: usize = 30;

#[derive(Debug, Default)]
pub(crate) struct SortedIntSet {
    values: Vec<u32>,
    counts: Vec<u32>,
    map: BTreeMap<u32, u32>,
    use_tree_map: bool,
}

impl SortedIntSet {
    pub(crate) fn new(capacity: usize) -> Self {
        SortedIntSet {
            values: Vec::with_capacity(capacity),
            counts: Vec::with_capacity(capacity),
            map: BTreeMap::new(),
            use_tree_map: false,
        }
    }

    pub(crate) fn incr(&mut self, num: u32) {
        if self.use_tree_map {
            *self.map.entry(num).or_insert(0) += 1;
            return;
        }
        match self.values.binary_search(&num) {
            Ok(i) => self.counts[i] += 1,
            Err(i) => {
                self.values.insert(i, num);
                self.counts.insert(i, 1);
                if self.values.len() == TREE_MAP_CUTOVER {
                    self.use_tree_map = true;
                    self.map.extend(self.values.iter().copied().zip(self.counts.iter().copied()));
                }
            }
        }
    }

    pub(crate) fn decr(&mut self, num: u32) {
        if self.use_tree_map {
            if let Some(count) = self.map.get_mut(&num) {
                *count -= 1;
                if *count == 0 {
                    self.map.remove(&num);
                }
            } else {
                debug_assert!(false, "decr of absent id {}", num);
            }
            if self.map.is_empty() {
                self.use_tree_map = false;
                self.values.clear();
                self.counts.clear();
            }
            return;
        }
        match self.values.binary_search(&num) {
            Ok(i) => {
                self.counts[i] -= 1;
                if self.counts[i] == 0 {
                    self.values.remove(i);
                    self.counts.remove(i);
                }
            }
            Err(_) => debug_assert!(false, "decr of absent id {}", num),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        if self.use_tree_map {
            self.map.len()
        } else {
            self.values.len()
        }
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The ids currently present, ascending.
    pub(crate) fn values(&mut self) -> &[u32] {
        if self.use_tree_map {
            self.values.clear();
            self.values.extend(self.map.keys().copied());
        }
        &self.values
    }

    pub(crate) fn freeze(&mut self) -> FrozenIntSet {
        FrozenIntSet {
            values: self.values().into(),
        }
    }
}

/// An immutable id set, usable as a map key.
///
/// Borrows as `[u32]`, so a registry keyed by `FrozenIntSet` can be probed
/// with the live working set without allocating.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct FrozenIntSet {
    values: Box<[u32]>,
}

impl FrozenIntSet {
    pub(crate) fn single(num: u32) -> Self {
        FrozenIntSet {
            values: Box::new([num]),
        }
    }

    #[inline]
    pub(crate) fn values(&self) -> &[u32] {
        &self.values
    }
}

impl Borrow<[u32]> for FrozenIntSet {
    fn borrow(&self) -> &[u32] {
        &self.values
    }
}
