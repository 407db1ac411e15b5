//! Finite automata over Unicode code points
//!
//! An [`Automaton`] is a graph of states whose transitions carry inclusive
//! code-point intervals. Automata are built from elementary pieces, combined
//! with the usual regular-language algebra, normalized, and finally compiled
//! into flat run tables for matching.
//!
//! # Module Organization
//!
//! - `state`: `StateId`, `Transition`, `State`
//! - `graph`: the `Automaton` type, its arena and structural operations
//! - `basic_automata`: elementary automata (`make_*`)
//! - `basic_operations`: union, concatenation, repetition, complement,
//!   intersection, subset construction and membership
//! - `sorted_int_set`: reference-counted state sets for subset construction
//! - `sparse_set`: O(1)-clear frontier for nondeterministic runs
//! - `minimization`: Hopcroft partition refinement
//! - `run_automaton`: compiled transition tables for code points and bytes
//! - `special_operations`: finiteness, prefixes, suffixes, reversal
//! - `daciuk_mihov`: minimal automata from sorted term lists
//! - `utf32_to_utf8`: code-point to UTF-8 byte conversion

mod basic_automata;
mod basic_operations;
mod daciuk_mihov;
mod graph;
mod minimization;
mod run_automaton;
mod sorted_int_set;
mod sparse_set;
mod special_operations;
mod state;
mod utf32_to_utf8;

// Re-export from state
pub use state::{State, StateId, Transition, MAX_CODE_POINT, MIN_CODE_POINT};

// Re-export from graph
pub use graph::Automaton;
pub(crate) use graph::Graph;

// Re-export from basic_automata
pub use basic_automata::{
    make_any_char, make_any_string, make_char, make_char_range, make_empty, make_empty_string,
    make_interval, make_string, make_string_union,
};

// Re-export from basic_operations
pub use basic_operations::{
    add_epsilons, complement, concatenate, concatenate_all, determinize, intersection, is_empty,
    is_empty_string, is_total, minus, optional, repeat, repeat_min, repeat_range, run,
    run_code_points, same_language, subset_of, union, union_all,
};

// Re-export from minimization
pub use minimization::{minimize, minimize_hopcroft};

// Re-export from run_automaton
pub use run_automaton::{ByteRunAutomaton, CharacterRunAutomaton, RunAutomaton};

// Re-export from special_operations
pub use special_operations::{
    common_prefix, common_prefix_bytes, common_suffix, common_suffix_bytes, find_index,
    finite_strings, is_finite, reverse,
};

// Re-export from daciuk_mihov
pub use daciuk_mihov::DaciukMihovAutomatonBuilder;

// Re-export from utf32_to_utf8
pub use utf32_to_utf8::Utf32ToUtf8;

#[cfg(test)]
mod tests;
