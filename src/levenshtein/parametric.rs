//! Parametric Levenshtein descriptions.
//!
//! Schulz and Mihov, "Fast String Correction with Levenshtein-Automata".
//! A parametric state is a set of positions relative to a moving base
//! offset into the word. Reading a symbol only depends on which of the next
//! `window` word symbols equal it (the characteristic vector) and on how
//! many word symbols remain, so the whole transition function can be
//! tabulated once per distance and reused for every word.
//!
//! Positions are `(offset, edits)` plus a transposition flag: a transposed
//! position has just read `word[offset + 1]` and still owes `word[offset]`.

use std::sync::OnceLock;

use log::{debug, trace};
use rustc_hash::FxHashMap;

/// Marks a dead transition.
pub const NO_STATE: u32 = u32::MAX;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
struct Position {
    offset: u32,
    edits: u32,
    transposed: bool,
}

impl Position {
    fn standard(offset: u32, edits: u32) -> Self {
        Position {
            offset,
            edits,
            transposed: false,
        }
    }

    fn transposed(offset: u32, edits: u32) -> Self {
        Position {
            offset,
            edits,
            transposed: true,
        }
    }

    /// True if every continuation accepted from `other` is accepted from
    /// `self`.
    fn subsumes(&self, other: &Position) -> bool {
        if self.edits >= other.edits {
            return false;
        }
        match (self.transposed, other.transposed) {
            (false, false) => self.offset.abs_diff(other.offset) <= other.edits - self.edits,
            (true, true) => self.offset == other.offset,
            _ => false,
        }
    }

    /// Smallest remaining length the position can be stepped under.
    fn required_length(&self) -> u32 {
        if self.transposed {
            self.offset + 2
        } else {
            self.offset
        }
    }
}

/// Precomputed transition tables for one distance and transposition mode.
#[derive(Debug)]
pub struct ParametricDescription {
    distance: u32,
    with_transpositions: bool,
    window: u32,
    /// Indexed by `((state * (window + 1) + remaining) << window) | vector`.
    next: Box<[u32]>,
    shift: Box<[u32]>,
    /// Per state, the least `edits - offset` over standard positions.
    min_errors: Box<[i32]>,
}

static DESCRIPTIONS: [OnceLock<ParametricDescription>; 4] = [
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
];

impl ParametricDescription {
    /// The shared description for `distance` (1 or 2), generated on first
    /// use.
    pub fn get(distance: u32, with_transpositions: bool) -> &'static ParametricDescription {
        debug_assert!((1..=2).contains(&distance));
        let slot = (distance as usize - 1) * 2 + usize::from(with_transpositions);
        DESCRIPTIONS[slot].get_or_init(|| Self::generate(distance, with_transpositions))
    }

    pub fn distance(&self) -> u32 {
        self.distance
    }

    pub fn with_transpositions(&self) -> bool {
        self.with_transpositions
    }

    /// Number of word symbols covered by a characteristic vector.
    pub fn window(&self) -> u32 {
        self.window
    }

    pub fn size(&self) -> usize {
        self.min_errors.len()
    }

    /// Next state and base shift after reading a symbol whose
    /// characteristic vector over the next `remaining` (at most `window`)
    /// word symbols is `vector`. `None` when no position survives.
    #[inline]
    pub fn transition(&self, state: u32, remaining: u32, vector: u32) -> Option<(u32, u32)> {
        debug_assert!(remaining <= self.window && vector < (1 << remaining));
        let i = self.index(state, remaining, vector);
        let next = self.next[i];
        (next != NO_STATE).then(|| (next, self.shift[i]))
    }

    /// True if `state`, with `remaining` word symbols left after the base,
    /// can finish within the distance by deleting them.
    #[inline]
    pub fn is_accept(&self, state: u32, remaining: u32) -> bool {
        i64::from(remaining) + i64::from(self.min_errors[state as usize]) <= i64::from(self.distance)
    }

    #[inline]
    fn index(&self, state: u32, remaining: u32, vector: u32) -> usize {
        (((state as usize) * (self.window as usize + 1) + remaining as usize) << self.window)
            | vector as usize
    }

    fn generate(distance: u32, with_transpositions: bool) -> Self {
        let window = 2 * distance + 2;
        let block = (window as usize + 1) << window;
        let mut states: Vec<Vec<Position>> = vec![vec![Position::standard(0, 0)]];
        let mut ids: FxHashMap<Vec<Position>, u32> = FxHashMap::default();
        ids.insert(states[0].clone(), 0);
        let mut next: Vec<u32> = Vec::new();
        let mut shift: Vec<u32> = Vec::new();

        let mut i = 0;
        while i < states.len() {
            next.resize(next.len() + block, NO_STATE);
            shift.resize(shift.len() + block, 0);
            let base = i * block;
            let min_remaining = states[i].iter().map(Position::required_length).max().unwrap_or(0);
            for remaining in min_remaining..=window {
                for vector in 0..(1u32 << remaining) {
                    let Some((positions, delta)) =
                        step(&states[i], remaining, vector, distance, with_transpositions)
                    else {
                        continue;
                    };
                    let id = match ids.get(&positions) {
                        Some(&id) => id,
                        None => {
                            let id = states.len() as u32;
                            trace!("levenshtein n={} state {}: {:?}", distance, id, positions);
                            ids.insert(positions.clone(), id);
                            states.push(positions);
                            id
                        }
                    };
                    let slot = base + ((remaining as usize) << window) + vector as usize;
                    next[slot] = id;
                    shift[slot] = delta;
                }
            }
            i += 1;
        }

        let min_errors = states
            .iter()
            .map(|positions| {
                positions
                    .iter()
                    .filter(|p| !p.transposed)
                    .map(|p| p.edits as i32 - p.offset as i32)
                    .min()
                    .unwrap_or(i32::MAX / 2)
            })
            .collect::<Vec<_>>();

        debug!(
            "levenshtein parametric description: n={} transpositions={} states={}",
            distance,
            with_transpositions,
            states.len()
        );
        ParametricDescription {
            distance,
            with_transpositions,
            window,
            next: next.into_boxed_slice(),
            shift: shift.into_boxed_slice(),
            min_errors: min_errors.into_boxed_slice(),
        }
    }
}

/// One symbol of the position automaton over a normalized state. Returns
/// the normalized successor and how far the base moved.
fn step(
    state: &[Position],
    remaining: u32,
    vector: u32,
    distance: u32,
    with_transpositions: bool,
) -> Option<(Vec<Position>, u32)> {
    let bit = |k: u32| k < remaining && vector & (1 << k) != 0;

    // Deletions are free moves along the word.
    let mut closed: Vec<Position> = Vec::with_capacity(state.len() * 2);
    for &p in state {
        closed.push(p);
        if p.transposed {
            continue;
        }
        let (mut k, mut e) = (p.offset, p.edits);
        while k < remaining && e < distance {
            k += 1;
            e += 1;
            closed.push(Position::standard(k, e));
        }
    }

    let mut out: Vec<Position> = Vec::new();
    for p in closed {
        let (k, e) = (p.offset, p.edits);
        if p.transposed {
            if bit(k) {
                out.push(Position::standard(k + 2, e));
            }
            continue;
        }
        if bit(k) {
            out.push(Position::standard(k + 1, e));
        }
        if e < distance {
            out.push(Position::standard(k, e + 1));
            if k < remaining {
                out.push(Position::standard(k + 1, e + 1));
            }
            if with_transpositions && bit(k + 1) {
                out.push(Position::transposed(k, e + 1));
            }
        }
    }
    if out.is_empty() {
        return None;
    }

    out.sort_unstable();
    out.dedup();
    let reduced: Vec<Position> = out
        .iter()
        .filter(|p| !out.iter().any(|q| q.subsumes(p)))
        .copied()
        .collect();

    let delta = reduced.iter().map(|p| p.offset).min().unwrap_or(0);
    let mut normalized: Vec<Position> = reduced
        .into_iter()
        .map(|p| Position {
            offset: p.offset - delta,
            ..p
        })
        .collect();
    normalized.sort_unstable();
    debug_assert!(normalized.iter().all(|p| p.required_length() <= 2 * distance + 2));
    Some((normalized, delta))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions_are_cached() {
        let a = ParametricDescription::get(1, false);
        let b = ParametricDescription::get(1, false);
        assert!(std::ptr::eq(a, b));
        assert!(!std::ptr::eq(a, ParametricDescription::get(1, true)));
        assert_eq!(a.window(), 4);
        assert_eq!(ParametricDescription::get(2, true).window(), 6);
    }

    #[test]
    fn test_initial_state_exact_match() {
        let d = ParametricDescription::get(1, false);
        // reading word[0] moves the base by one and keeps zero errors
        let (s, shift) = d.transition(0, 3, 0b001).unwrap();
        assert_eq!(shift, 1);
        assert!(d.is_accept(s, 1));
        assert!(!d.is_accept(s, 3));
    }

    #[test]
    fn test_dead_after_too_many_errors() {
        let d = ParametricDescription::get(1, false);
        let (s, _) = d.transition(0, 4, 0).unwrap();
        let mut dead = false;
        let mut state = s;
        for _ in 0..3 {
            match d.transition(state, 4, 0) {
                Some((next, _)) => state = next,
                None => {
                    dead = true;
                    break;
                }
            }
        }
        assert!(dead);
    }

    #[test]
    fn test_subsumption() {
        let a = Position::standard(1, 0);
        assert!(a.subsumes(&Position::standard(2, 1)));
        assert!(a.subsumes(&Position::standard(0, 1)));
        assert!(!a.subsumes(&Position::standard(3, 1)));
        assert!(!a.subsumes(&Position::standard(1, 0)));
        assert!(!a.subsumes(&Position::transposed(1, 1)));
        assert!(Position::transposed(1, 1).subsumes(&Position::transposed(1, 2)));
    }

    #[test]
    fn test_state_counts_are_small() {
        for n in 1..=2 {
            for t in [false, true] {
                let d = ParametricDescription::get(n, t);
                assert!(d.size() > 1);
                assert!(d.size() < 2000, "n={} t={} size={}", n, t, d.size());
            }
        }
    }
}
