//! Levenshtein automata
//!
//! [`LevenshteinAutomata`] builds, for a fixed word, a deterministic
//! automaton accepting every string within edit distance `n` (at most 2)
//! of it. Insertions, deletions and substitutions cost one; with
//! transpositions enabled, swapping two adjacent symbols also costs one.
//!
//! The word-independent part of the construction is a
//! [`ParametricDescription`], generated once per distance and cached.
//! Building for a word walks that table, pairing each parametric state
//! with a base offset into the word.

mod parametric;

use std::collections::VecDeque;

use log::debug;
use rustc_hash::FxHashMap;

use crate::automaton::{
    concatenate, make_string, Automaton, Graph, StateId, Transition, MAX_CODE_POINT,
};
use crate::error::{AutomatonError, Result};

pub use parametric::ParametricDescription;

/// Largest edit distance with a parametric description.
pub const MAXIMUM_SUPPORTED_DISTANCE: u32 = 2;

/// Builder of Levenshtein automata for one word.
#[derive(Clone, Debug)]
pub struct LevenshteinAutomata {
    word: Vec<u32>,
    /// Distinct symbols of the word, sorted.
    alphabet: Vec<u32>,
    alpha_max: u32,
    with_transpositions: bool,
}

impl LevenshteinAutomata {
    /// Automata over the full code-point alphabet.
    pub fn new(word: &str, with_transpositions: bool) -> Self {
        let word: Vec<u32> = word.chars().map(u32::from).collect();
        Self::build(word, MAX_CODE_POINT, with_transpositions)
    }

    /// Automata over the alphabet `0..=alpha_max`, e.g. 255 for bytes.
    pub fn with_alpha_max(word: &[u32], alpha_max: u32, with_transpositions: bool) -> Result<Self> {
        if let Some(&c) = word.iter().find(|&&c| c > alpha_max) {
            return Err(AutomatonError::SymbolOutOfRange {
                code_point: c,
                max: alpha_max,
            });
        }
        Ok(Self::build(word.to_vec(), alpha_max, with_transpositions))
    }

    fn build(word: Vec<u32>, alpha_max: u32, with_transpositions: bool) -> Self {
        let mut alphabet = word.clone();
        alphabet.sort_unstable();
        alphabet.dedup();
        LevenshteinAutomata {
            word,
            alphabet,
            alpha_max,
            with_transpositions,
        }
    }

    pub fn word(&self) -> &[u32] {
        &self.word
    }

    /// Automaton accepting every string within distance `n` of the word.
    pub fn to_automaton(&self, n: u32) -> Result<Automaton> {
        if n == 0 {
            return Ok(exact(&self.word));
        }
        if n > MAXIMUM_SUPPORTED_DISTANCE {
            return Err(AutomatonError::UnsupportedDistance(n));
        }
        let description = ParametricDescription::get(n, self.with_transpositions);
        Ok(self.walk(description))
    }

    /// `prefix` exactly, followed by anything within distance `n` of the
    /// word.
    pub fn to_automaton_with_prefix(&self, n: u32, prefix: &str) -> Result<Automaton> {
        let fuzzy = self.to_automaton(n)?;
        Ok(concatenate(make_string(prefix), fuzzy))
    }

    /// Pairs parametric states with base offsets, breadth first.
    fn walk(&self, description: &ParametricDescription) -> Automaton {
        let len = self.word.len() as u32;
        let window = description.window();

        let mut g = Graph::bare();
        let mut ids: FxHashMap<(u32, u32), StateId> = FxHashMap::default();
        let mut worklist: VecDeque<(u32, u32)> = VecDeque::new();
        let initial = g.new_state();
        g.initial = initial;
        ids.insert((0, 0), initial);
        worklist.push_back((0, 0));

        let gaps = self.gaps();
        while let Some((state, base)) = worklist.pop_front() {
            let from = ids[&(state, base)];
            let remaining = len - base;
            g.set_accept(from, description.is_accept(state, remaining));

            let r = remaining.min(window);
            let word = &self.word[base as usize..(base + r) as usize];
            let mut targets: Vec<(u32, u32, u32)> = self
                .alphabet
                .iter()
                .map(|&c| (c, c, vector(word, c)))
                .collect();
            targets.extend(gaps.iter().map(|&(lo, hi)| (lo, hi, 0)));

            for (min, max, v) in targets {
                let Some((next, shift)) = description.transition(state, r, v) else {
                    continue;
                };
                let key = (next, base + shift);
                let to = match ids.get(&key) {
                    Some(&to) => to,
                    None => {
                        let to = g.new_state();
                        ids.insert(key, to);
                        worklist.push_back(key);
                        to
                    }
                };
                g.add_transition(from, Transition::new(min, max, to));
            }
        }

        let mut a = Automaton::from_graph(g, true);
        a.reduce();
        debug!(
            "levenshtein automaton: word length {}, n={}, {} states",
            len,
            description.distance(),
            a.num_states()
        );
        a
    }

    /// Intervals of `0..=alpha_max` holding no symbol of the word.
    fn gaps(&self) -> Vec<(u32, u32)> {
        let mut gaps = Vec::with_capacity(self.alphabet.len() + 1);
        let mut next = 0u32;
        for &c in &self.alphabet {
            if c > next {
                gaps.push((next, c - 1));
            }
            next = c + 1;
        }
        if next <= self.alpha_max {
            gaps.push((next, self.alpha_max));
        }
        gaps
    }
}

/// Bit `i` set iff `word[i] == c`.
fn vector(word: &[u32], c: u32) -> u32 {
    word.iter()
        .enumerate()
        .filter(|&(_, &w)| w == c)
        .fold(0, |v, (i, _)| v | (1 << i))
}

fn exact(word: &[u32]) -> Automaton {
    match word.iter().map(|&c| char::from_u32(c)).collect::<Option<String>>() {
        Some(s) => make_string(&s),
        None => Automaton::from_graph(Graph::from_code_points(word.iter().copied()), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{finite_strings, intersection, make_char_range, repeat_range, run_code_points};

    /// Restricted Damerau distance (optimal string alignment).
    fn osa_distance(a: &[u32], b: &[u32], transpositions: bool) -> usize {
        let (n, m) = (a.len(), b.len());
        let mut d = vec![vec![0usize; m + 1]; n + 1];
        for (i, row) in d.iter_mut().enumerate() {
            row[0] = i;
        }
        for j in 0..=m {
            d[0][j] = j;
        }
        for i in 1..=n {
            for j in 1..=m {
                let cost = usize::from(a[i - 1] != b[j - 1]);
                let mut best = (d[i - 1][j] + 1).min(d[i][j - 1] + 1).min(d[i - 1][j - 1] + cost);
                if transpositions && i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                    best = best.min(d[i - 2][j - 2] + 1);
                }
                d[i][j] = best;
            }
        }
        d[n][m]
    }

    /// Every string over `alphabet` up to length `max_len`.
    fn all_strings(alphabet: &[u32], max_len: usize) -> Vec<Vec<u32>> {
        let mut out = vec![Vec::new()];
        let mut frontier = vec![Vec::new()];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for s in &frontier {
                for &c in alphabet {
                    let mut t: Vec<u32> = s.clone();
                    t.push(c);
                    next.push(t);
                }
            }
            out.extend(next.iter().cloned());
            frontier = next;
        }
        out
    }

    fn check_against_oracle(word: &str, n: u32, transpositions: bool) {
        let alphabet: Vec<u32> = "catx".chars().map(u32::from).collect();
        let w: Vec<u32> = word.chars().map(u32::from).collect();
        let a = LevenshteinAutomata::new(word, transpositions).to_automaton(n).unwrap();
        assert!(a.is_deterministic());
        for s in all_strings(&alphabet, 5) {
            let expected = osa_distance(&w, &s, transpositions) <= n as usize;
            assert_eq!(
                run_code_points(&a, s.iter().copied()),
                expected,
                "word={:?} n={} t={} input={:?}",
                word,
                n,
                transpositions,
                s.iter().filter_map(|&c| char::from_u32(c)).collect::<String>()
            );
        }
    }

    #[test]
    fn test_distance_one_matches_oracle() {
        for word in ["", "a", "cat", "tac", "abcab"] {
            check_against_oracle(word, 1, false);
        }
    }

    #[test]
    fn test_distance_two_matches_oracle() {
        for word in ["", "a", "cat", "tact"] {
            check_against_oracle(word, 2, false);
        }
    }

    #[test]
    fn test_transpositions_match_oracle() {
        for word in ["ca", "cat", "taca"] {
            check_against_oracle(word, 1, true);
            check_against_oracle(word, 2, true);
        }
    }

    #[test]
    fn test_transposition_cost() {
        let lev = LevenshteinAutomata::new("abcd", false).to_automaton(1).unwrap();
        let dam = LevenshteinAutomata::new("abcd", true).to_automaton(1).unwrap();
        assert!(!lev.run("bacd"));
        assert!(dam.run("bacd"));
        assert!(dam.run("abdc"));
        assert!(!dam.run("badc"));
    }

    #[test]
    fn test_distance_zero_and_unsupported() {
        let a = LevenshteinAutomata::new("word", false).to_automaton(0).unwrap();
        assert_eq!(a.singleton(), Some("word"));
        assert_eq!(
            LevenshteinAutomata::new("word", false).to_automaton(3).unwrap_err(),
            AutomatonError::UnsupportedDistance(3)
        );
    }

    #[test]
    fn test_symbols_outside_alphabet() {
        let a = LevenshteinAutomata::new("caf\u{e9}", false).to_automaton(1).unwrap();
        assert!(a.run("cafe"));
        assert!(a.run("caf\u{1F600}"));
        assert!(a.run("\u{10FFFF}af\u{e9}"));
        assert!(!a.run("c\u{1F600}f\u{1F600}"));
    }

    #[test]
    fn test_alpha_max() {
        let err = LevenshteinAutomata::with_alpha_max(&[0x61, 0x300], 0xFF, false).unwrap_err();
        assert_eq!(
            err,
            AutomatonError::SymbolOutOfRange {
                code_point: 0x300,
                max: 0xFF
            }
        );

        let bytes = LevenshteinAutomata::with_alpha_max(&[0x61, 0x62], 0xFF, false)
            .unwrap()
            .to_automaton(1)
            .unwrap();
        assert!(run_code_points(&bytes, [0x61, 0xFF]));
        assert!(!run_code_points(&bytes, [0x61, 0x100]));
    }

    #[test]
    fn test_with_prefix() {
        let lev = LevenshteinAutomata::new("ord", false);
        let a = lev.to_automaton_with_prefix(1, "w").unwrap();
        assert!(a.run("word"));
        assert!(a.run("wore"));
        assert!(a.run("wor"));
        assert!(!a.run("ord"));
        assert!(!a.run("xord"));
    }

    #[test]
    fn test_language_is_finite_and_bounded() {
        let a = LevenshteinAutomata::new("ab", false).to_automaton(1).unwrap();
        let ab = make_char_range('a' as u32, 'b' as u32);
        let restricted = intersection(&a, &repeat_range(ab, 0, 3));
        let strings = finite_strings(&restricted, None).unwrap();
        for s in &strings {
            let dist = osa_distance(&[0x61, 0x62], s, false);
            assert!(dist <= 1, "{:?}", s);
        }
        assert!(strings.contains(&vec![0x61, 0x62]));
        assert!(strings.contains(&vec![0x62]));
    }
}
