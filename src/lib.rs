//! termfa: finite automata over Unicode code points for term matching
//!
//! Build an [`Automaton`] from a regular expression, an edit-distance bound
//! around a word, or a sorted list of terms; combine automata with the
//! regular-language algebra; then compile the result into a flat
//! [`CharacterRunAutomaton`] or [`ByteRunAutomaton`] that a term dictionary
//! can walk one code point or byte at a time.
//!
//! ```
//! use termfa::{ByteRunAutomaton, LevenshteinAutomata, RegExp};
//!
//! let fuzzy = LevenshteinAutomata::new("kitten", false).to_automaton(1).unwrap();
//! let prefix = RegExp::new("ki.*").unwrap().to_automaton().unwrap();
//! let both = fuzzy.intersection(&prefix);
//!
//! let run = ByteRunAutomaton::new(both);
//! assert!(run.run(b"kittn"));
//! assert!(!run.run(b"sitten"));
//! ```
//!
//! Automata are plain values: composition functions take their operands by
//! value and reuse their storage, so clone first to keep an input. Compiled
//! run automata are immutable and `Send + Sync`.

pub mod automaton;
mod error;
pub mod levenshtein;
pub mod regexp;

pub use automaton::{
    Automaton, ByteRunAutomaton, CharacterRunAutomaton, DaciukMihovAutomatonBuilder,
    RunAutomaton, Utf32ToUtf8,
};
pub use error::{AutomatonError, Result};
pub use levenshtein::LevenshteinAutomata;
pub use regexp::{AutomatonProvider, RegExp, SyntaxFlags};
