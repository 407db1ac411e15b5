//! Rewrites a code-point automaton into a byte automaton over UTF-8.
//!
//! Every code-point interval `[min, max]` on an edge is cut into pieces
//! whose members share an encoded length, skipping the surrogate block.
//! Each piece becomes a small byte-range subgraph between the two mapped
//! states: a shared leading prefix, then a low edge, a middle of full
//! continuation ranges, and a high edge.

use log::debug;

use super::graph::{Automaton, Graph};
use super::state::{StateId, Transition};

/// Code-point ranges that encode to a fixed number of bytes. Surrogates
/// (`D800..=DFFF`) are not encodable and fall between two entries.
const SEGMENTS: [(u32, u32); 5] = [
    (0x0000, 0x007F),
    (0x0080, 0x07FF),
    (0x0800, 0xD7FF),
    (0xE000, 0xFFFF),
    (0x10000, 0x10FFFF),
];

const CONT_MIN: u32 = 0x80;
const CONT_MAX: u32 = 0xBF;

/// A UTF-8 encoding: byte values plus length.
#[derive(Clone, Copy, Debug, Default)]
struct Utf8Seq {
    bytes: [u32; 4],
    len: usize,
}

impl Utf8Seq {
    fn encode(c: u32) -> Self {
        let mut bytes = [0u32; 4];
        let len = if c < 0x80 {
            bytes[0] = c;
            1
        } else if c < 0x800 {
            bytes[0] = 0xC0 | (c >> 6);
            bytes[1] = 0x80 | (c & 0x3F);
            2
        } else if c < 0x10000 {
            bytes[0] = 0xE0 | (c >> 12);
            bytes[1] = 0x80 | ((c >> 6) & 0x3F);
            bytes[2] = 0x80 | (c & 0x3F);
            3
        } else {
            bytes[0] = 0xF0 | (c >> 18);
            bytes[1] = 0x80 | ((c >> 12) & 0x3F);
            bytes[2] = 0x80 | ((c >> 6) & 0x3F);
            bytes[3] = 0x80 | (c & 0x3F);
            4
        };
        Utf8Seq { bytes, len }
    }

    #[inline]
    fn at(&self, i: usize) -> u32 {
        self.bytes[i]
    }

    #[inline]
    fn last(&self) -> usize {
        self.len - 1
    }
}

/// Converter from code-point automata to UTF-8 byte automata.
#[derive(Debug, Default)]
pub struct Utf32ToUtf8 {
    pieces: Vec<(u32, u32)>,
}

impl Utf32ToUtf8 {
    pub fn new() -> Self {
        Utf32ToUtf8::default()
    }

    /// Returns a nondeterministic byte automaton accepting the UTF-8
    /// encodings of exactly the strings `automaton` accepts.
    pub fn convert(&mut self, automaton: &Automaton) -> Automaton {
        let mut src = automaton.clone().into_graph();
        src.renumber();

        let mut out = Graph::bare();
        let mut map = vec![StateId::NONE; src.states.len()];
        map[src.initial.index()] = out.new_state();
        out.initial = map[src.initial.index()];

        let mut pending = vec![src.initial];
        while let Some(s) = pending.pop() {
            let u = map[s.index()];
            let state = src.state(s);
            out.set_accept(u, state.is_accept());
            for t in state.transitions() {
                let dest = match map[t.to.index()] {
                    d if d.is_none() => {
                        let d = out.new_state();
                        map[t.to.index()] = d;
                        pending.push(t.to);
                        d
                    }
                    d => d,
                };
                self.convert_range(&mut out, u, dest, t.min, t.max);
            }
        }

        debug!(
            "utf8 conversion: {} code-point states -> {} byte states",
            src.states.len(),
            out.states.len()
        );
        Automaton::from_graph(out, false)
    }

    fn convert_range(&mut self, g: &mut Graph, start: StateId, end: StateId, min: u32, max: u32) {
        self.pieces.clear();
        for &(lo, hi) in &SEGMENTS {
            let (a, b) = (min.max(lo), max.min(hi));
            if a <= b {
                self.pieces.push((a, b));
            }
        }
        for &(a, b) in &self.pieces {
            let lo = Utf8Seq::encode(a);
            let hi = Utf8Seq::encode(b);
            debug_assert_eq!(lo.len, hi.len);
            build(g, start, end, &lo, &hi, 0);
        }
    }
}

/// Byte paths from `start` to `end` for every encoding in `[lo, hi]`,
/// both of the same length, whose bytes before `upto` are equal.
fn build(g: &mut Graph, start: StateId, end: StateId, lo: &Utf8Seq, hi: &Utf8Seq, upto: usize) {
    let (l, h) = (lo.at(upto), hi.at(upto));
    if upto == lo.last() {
        g.add_transition(start, Transition::new(l, h, end));
    } else if l == h {
        let n = g.new_state();
        g.add_transition(start, Transition::single(l, n));
        build(g, n, end, lo, hi, upto + 1);
    } else {
        let n = g.new_state();
        g.add_transition(start, Transition::single(l, n));
        build_low(g, n, end, lo, upto + 1);
        if h - l > 1 {
            all(g, start, end, l + 1, h - 1, lo.last() - upto);
        }
        let n = g.new_state();
        g.add_transition(start, Transition::single(h, n));
        build_high(g, n, end, hi, upto + 1);
    }
}

/// Encodings from `seq` up to the top of the current lead byte.
fn build_low(g: &mut Graph, start: StateId, end: StateId, seq: &Utf8Seq, upto: usize) {
    let b = seq.at(upto);
    if upto == seq.last() {
        g.add_transition(start, Transition::new(b, CONT_MAX, end));
        return;
    }
    let n = g.new_state();
    g.add_transition(start, Transition::single(b, n));
    build_low(g, n, end, seq, upto + 1);
    if b < CONT_MAX {
        all(g, start, end, b + 1, CONT_MAX, seq.last() - upto);
    }
}

/// Encodings from the bottom of the current lead byte up to `seq`.
fn build_high(g: &mut Graph, start: StateId, end: StateId, seq: &Utf8Seq, upto: usize) {
    let b = seq.at(upto);
    if upto == seq.last() {
        g.add_transition(start, Transition::new(CONT_MIN, b, end));
        return;
    }
    if b > CONT_MIN {
        all(g, start, end, CONT_MIN, b - 1, seq.last() - upto);
    }
    let n = g.new_state();
    g.add_transition(start, Transition::single(b, n));
    build_high(g, n, end, seq, upto + 1);
}

/// `[min, max]` followed by `left` unconstrained continuation bytes.
fn all(g: &mut Graph, start: StateId, end: StateId, min: u32, max: u32, left: usize) {
    if left == 0 {
        g.add_transition(start, Transition::new(min, max, end));
        return;
    }
    let mut last = g.new_state();
    g.add_transition(start, Transition::new(min, max, last));
    for _ in 1..left {
        let n = g.new_state();
        g.add_transition(last, Transition::new(CONT_MIN, CONT_MAX, n));
        last = n;
    }
    g.add_transition(last, Transition::new(CONT_MIN, CONT_MAX, end));
}
