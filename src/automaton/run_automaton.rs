//! Compiled, immutable transition tables.
//!
//! A `RunAutomaton` flattens a deterministic automaton into:
//!
//! - `points`: sorted interval start points, one per alphabet class
//! - `transitions`: `state * classes + class -> state`, `NO_TRANSITION` when dead
//! - `accept`: accept flag per state
//! - `classmap`: optional direct symbol-to-class table up to `max_interval`
//!
//! Once built nothing mutates, so a table can be shared across threads.

use std::fmt;
use std::ops::Deref;

use log::debug;

use super::graph::Automaton;
use super::special_operations::find_index;
use super::state::{write_symbol, MAX_CODE_POINT};
use super::utf32_to_utf8::Utf32ToUtf8;

const NO_TRANSITION: u32 = u32::MAX;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunAutomaton {
    max_interval: u32,
    size: usize,
    accept: Box<[bool]>,
    initial: u32,
    transitions: Box<[u32]>,
    points: Box<[u32]>,
    classmap: Option<Box<[u32]>>,
}

impl RunAutomaton {
    /// Determinizes `automaton` and compiles it.
    ///
    /// With `tableize`, symbols up to `max_interval` map to their class
    /// through a direct lookup table; larger symbols fall back to binary
    /// search over the start points.
    pub fn new(mut automaton: Automaton, max_interval: u32, tableize: bool) -> Self {
        automaton.determinize();
        let g = automaton.graph_mut();
        g.sort_transitions();
        let points = g.start_points();
        let states = &g.states;
        let size = states.len();
        let classes = points.len();

        let mut accept = vec![false; size];
        let mut transitions = vec![NO_TRANSITION; size * classes];
        for (n, s) in states.iter().enumerate() {
            accept[n] = s.is_accept();
            let ts = s.transitions();
            let mut ti = 0;
            for (c, &point) in points.iter().enumerate() {
                while ti < ts.len() && ts[ti].max < point {
                    ti += 1;
                }
                if ti < ts.len() && ts[ti].contains(point) {
                    transitions[n * classes + c] = ts[ti].to.0;
                }
            }
        }

        let classmap = tableize.then(|| {
            let mut map = vec![0u32; max_interval as usize + 1];
            let mut i = 0usize;
            for (j, slot) in map.iter_mut().enumerate() {
                if i + 1 < classes && j as u32 == points[i + 1] {
                    i += 1;
                }
                *slot = i as u32;
            }
            map.into_boxed_slice()
        });

        debug!(
            "run automaton: {} states, {} classes, tableized={}",
            size, classes, tableize
        );
        RunAutomaton {
            max_interval,
            size,
            accept: accept.into_boxed_slice(),
            initial: g.initial.0,
            transitions: transitions.into_boxed_slice(),
            points: points.into_boxed_slice(),
            classmap,
        }
    }

    /// Number of states.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_accept(&self, state: u32) -> bool {
        self.accept[state as usize]
    }

    #[inline]
    pub fn initial_state(&self) -> u32 {
        self.initial
    }

    /// Sorted start points of the alphabet classes.
    #[inline]
    pub fn char_intervals(&self) -> &[u32] {
        &self.points
    }

    /// Alphabet class of symbol `c`.
    #[inline]
    pub fn char_class(&self, c: u32) -> usize {
        match &self.classmap {
            Some(map) if c <= self.max_interval => map[c as usize] as usize,
            _ => find_index(c, &self.points),
        }
    }

    /// Next state, or `None` where the automaton can no longer accept.
    #[inline]
    pub fn step(&self, state: u32, c: u32) -> Option<u32> {
        let next = self.transitions[state as usize * self.points.len() + self.char_class(c)];
        (next != NO_TRANSITION).then_some(next)
    }

    /// Runs a symbol sequence from the initial state.
    pub fn run_symbols(&self, symbols: impl IntoIterator<Item = u32>) -> bool {
        let mut p = self.initial;
        for c in symbols {
            match self.step(p, c) {
                Some(q) => p = q,
                None => return false,
            }
        }
        self.accept[p as usize]
    }
}

impl fmt::Display for RunAutomaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "initial state: {}", self.initial)?;
        let classes = self.points.len();
        for state in 0..self.size {
            let kind = if self.accept[state] { "accept" } else { "reject" };
            writeln!(f, "state {} [{}]:", state, kind)?;
            for (class, &min) in self.points.iter().enumerate() {
                let to = self.transitions[state * classes + class];
                if to == NO_TRANSITION {
                    continue;
                }
                let max = match self.points.get(class + 1) {
                    Some(&next) => next - 1,
                    None => self.max_interval,
                };
                f.write_str("  ")?;
                write_symbol(f, min)?;
                if min != max {
                    f.write_str("-")?;
                    write_symbol(f, max)?;
                }
                writeln!(f, " -> {}", to)?;
            }
        }
        Ok(())
    }
}

/// Run automaton over code points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterRunAutomaton {
    inner: RunAutomaton,
}

impl CharacterRunAutomaton {
    pub fn new(automaton: Automaton) -> Self {
        CharacterRunAutomaton {
            inner: RunAutomaton::new(automaton, MAX_CODE_POINT, false),
        }
    }

    pub fn run(&self, s: &str) -> bool {
        self.inner.run_symbols(s.chars().map(u32::from))
    }

    pub fn run_code_points(&self, code_points: &[u32]) -> bool {
        self.inner.run_symbols(code_points.iter().copied())
    }

    /// Runs UTF-16 code units, joining surrogate pairs. An unpaired
    /// surrogate is fed as its own code unit value.
    pub fn run_utf16(&self, units: &[u16]) -> bool {
        self.inner.run_symbols(
            char::decode_utf16(units.iter().copied())
                .map(|r| r.map_or_else(|e| u32::from(e.unpaired_surrogate()), u32::from)),
        )
    }
}

impl Deref for CharacterRunAutomaton {
    type Target = RunAutomaton;

    fn deref(&self) -> &RunAutomaton {
        &self.inner
    }
}

/// Run automaton over UTF-8 bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteRunAutomaton {
    inner: RunAutomaton,
}

impl ByteRunAutomaton {
    /// Compiles a code-point automaton to match its UTF-8 encoding.
    pub fn new(automaton: Automaton) -> Self {
        Self::with_binary(automaton, false)
    }

    /// With `is_binary`, `automaton` is taken to already be over bytes.
    pub fn with_binary(automaton: Automaton, is_binary: bool) -> Self {
        let automaton = if is_binary {
            automaton
        } else {
            Utf32ToUtf8::new().convert(&automaton)
        };
        ByteRunAutomaton {
            inner: RunAutomaton::new(automaton, 255, true),
        }
    }

    pub fn run(&self, bytes: &[u8]) -> bool {
        self.inner.run_symbols(bytes.iter().map(|&b| u32::from(b)))
    }
}

impl Deref for ByteRunAutomaton {
    type Target = RunAutomaton;

    fn deref(&self) -> &RunAutomaton {
        &self.inner
    }
}
