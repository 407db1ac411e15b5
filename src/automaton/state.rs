//! States and interval transitions.
//!
//! A state is an accept flag plus a list of outgoing transitions. Each
//! transition covers an inclusive code-point interval `[min, max]` and
//! names its destination by `StateId`, an index into the owning
//! automaton's state arena. Indices let cycles exist without shared
//! ownership.

use std::cmp::Ordering;
use std::fmt;

/// Smallest code point.
pub const MIN_CODE_POINT: u32 = 0;

/// Largest code point.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// A state identifier: an index into an automaton's state arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
pub struct StateId(pub(crate) u32);

impl StateId {
    /// Sentinel for "no state".
    pub const NONE: StateId = StateId(u32::MAX);

    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize);
        StateId(index as u32)
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transition over the inclusive interval `[min, max]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Transition {
    pub min: u32,
    pub max: u32,
    pub to: StateId,
}

impl Transition {
    /// Builds a transition, swapping the bounds if they arrive reversed.
    #[inline]
    pub fn new(min: u32, max: u32, to: StateId) -> Self {
        if max < min {
            Transition {
                min: max,
                max: min,
                to,
            }
        } else {
            Transition { min, max, to }
        }
    }

    /// A transition on exactly one symbol.
    #[inline]
    pub fn single(c: u32, to: StateId) -> Self {
        Transition { min: c, max: c, to }
    }

    #[inline]
    pub fn contains(&self, c: u32) -> bool {
        self.min <= c && c <= self.max
    }

    /// Order by `min` ascending, wider intervals first, then destination.
    pub(crate) fn cmp_min_max_then_dest(&self, other: &Self) -> Ordering {
        self.min
            .cmp(&other.min)
            .then_with(|| other.max.cmp(&self.max))
            .then_with(|| self.to.cmp(&other.to))
    }

    /// Order by destination, then `min` ascending, wider intervals first.
    pub(crate) fn cmp_dest_then_min_max(&self, other: &Self) -> Ordering {
        self.to
            .cmp(&other.to)
            .then_with(|| self.min.cmp(&other.min))
            .then_with(|| other.max.cmp(&self.max))
    }
}

/// Writes a symbol the way transitions print it: printable ASCII as-is,
/// everything else as `\uXXXX`.
pub(crate) fn write_symbol(f: &mut impl fmt::Write, c: u32) -> fmt::Result {
    if (0x21..=0x7e).contains(&c) && c != u32::from(b'\\') && c != u32::from(b'"') {
        // Printable ASCII always maps to a char.
        f.write_char(char::from(c as u8))
    } else {
        write!(f, "\\u{:04x}", c)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_symbol(f, self.min)?;
        if self.min != self.max {
            f.write_str("-")?;
            write_symbol(f, self.max)?;
        }
        write!(f, " -> {}", self.to)
    }
}

/// A state: accept flag plus outgoing transitions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct State {
    pub(crate) accept: bool,
    pub(crate) transitions: Vec<Transition>,
}

impl State {
    pub fn new() -> Self {
        State::default()
    }

    pub(crate) fn with_accept(accept: bool) -> Self {
        State {
            accept,
            transitions: Vec::new(),
        }
    }

    #[inline]
    pub fn is_accept(&self) -> bool {
        self.accept
    }

    #[inline]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    #[inline]
    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    #[inline]
    pub(crate) fn add_transition(&mut self, t: Transition) {
        self.transitions.push(t);
    }

    /// Destination for `c`, taking the first matching transition.
    ///
    /// On a deterministic automaton there is at most one.
    pub fn step(&self, c: u32) -> Option<StateId> {
        self.transitions
            .iter()
            .find(|t| t.contains(c))
            .map(|t| t.to)
    }

    /// Pushes every destination for `c` into `dest`.
    pub fn step_all(&self, c: u32, dest: &mut Vec<StateId>) {
        dest.extend(self.transitions.iter().filter(|t| t.contains(c)).map(|t| t.to));
    }

    pub(crate) fn sort_transitions(&mut self) {
        self.transitions.sort_by(Transition::cmp_min_max_then_dest);
    }

    /// Merges overlapping and adjacent intervals that share a destination.
    ///
    /// Leaves the transitions sorted by `min`.
    pub(crate) fn reduce(&mut self) {
        if self.transitions.len() <= 1 {
            return;
        }
        self.transitions.sort_by(Transition::cmp_dest_then_min_max);
        let mut merged: Vec<Transition> = Vec::with_capacity(self.transitions.len());
        for t in self.transitions.drain(..) {
            match merged.last_mut() {
                Some(last) if last.to == t.to && t.min <= last.max.saturating_add(1) => {
                    if t.max > last.max {
                        last.max = t.max;
                    }
                }
                _ => merged.push(t),
            }
        }
        merged.sort_by(Transition::cmp_min_max_then_dest);
        self.transitions = merged;
    }
}
