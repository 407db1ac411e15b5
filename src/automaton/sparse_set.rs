//! Sparse set of state ids with O(1) clear.
//!
//! Based on: https://research.swtch.com/sparse
//!
//! Used as the frontier when running a nondeterministic automaton: one set
//! holds the current states, the other collects the next step, then they
//! swap. Capacity is the arena size and is fixed up front.

use super::state::StateId;

#[derive(Clone, Debug)]
pub(crate) struct SparseSet {
    len: usize,
    /// Members in insertion order.
    dense: Vec<StateId>,
    /// `sparse[id]` is the position of `id` in `dense`, when present.
    sparse: Vec<u32>,
}

impl SparseSet {
    pub(crate) fn new(capacity: usize) -> Self {
        SparseSet {
            len: 0,
            dense: vec![StateId::NONE; capacity],
            sparse: vec![0; capacity],
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.dense.len()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if `id` was not already present.
    #[inline]
    pub(crate) fn insert(&mut self, id: StateId) -> bool {
        if self.contains(id) {
            return false;
        }
        debug_assert!(self.len < self.capacity(), "sparse set overflow at {}", self.len);
        self.dense[self.len] = id;
        self.sparse[id.index()] = self.len as u32;
        self.len += 1;
        true
    }

    #[inline]
    pub(crate) fn contains(&self, id: StateId) -> bool {
        let pos = self.sparse[id.index()] as usize;
        pos < self.len && self.dense[pos] == id
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    pub(crate) fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.dense[..self.len].iter().copied()
    }
}

/// Current and next frontier for NFA stepping.
#[derive(Clone, Debug)]
pub(crate) struct SparseSets {
    pub(crate) current: SparseSet,
    pub(crate) next: SparseSet,
}

impl SparseSets {
    pub(crate) fn new(capacity: usize) -> Self {
        SparseSets {
            current: SparseSet::new(capacity),
            next: SparseSet::new(capacity),
        }
    }

    /// Makes `next` current and clears the new `next`.
    #[inline]
    pub(crate) fn advance(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
        self.next.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(i: usize) -> StateId {
        StateId::new(i)
    }

    #[test]
    fn test_sparse_set_basic() {
        let mut set = SparseSet::new(10);
        assert!(set.is_empty());
        assert_eq!(set.capacity(), 10);

        assert!(set.insert(sid(3)));
        assert!(set.insert(sid(7)));
        assert!(set.insert(sid(1)));
        assert_eq!(set.len(), 3);
        assert!(set.contains(sid(7)));
        assert!(!set.contains(sid(0)));

        // Duplicate insert returns false
        assert!(!set.insert(sid(3)));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_sparse_set_insertion_order_and_clear() {
        let mut set = SparseSet::new(10);
        for i in [5, 2, 8, 1] {
            set.insert(sid(i));
        }
        let items: Vec<_> = set.iter().map(StateId::index).collect();
        assert_eq!(items, vec![5, 2, 8, 1]);

        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(sid(5)));
        set.insert(sid(9));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_sparse_sets_advance() {
        let mut sets = SparseSets::new(10);
        sets.current.insert(sid(1));
        sets.next.insert(sid(3));
        sets.next.insert(sid(4));

        sets.advance();
        assert_eq!(sets.current.len(), 2);
        assert!(sets.current.contains(sid(3)));
        assert!(sets.next.is_empty());
    }
}
