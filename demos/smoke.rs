//! Walks a small sorted term dictionary with regexp, fuzzy and term-set
//! matchers.
//!
//! Run with `cargo run --example smoke`.

use termfa::automaton::{common_prefix, finite_strings};
use termfa::{
    AutomatonError, ByteRunAutomaton, DaciukMihovAutomatonBuilder, LevenshteinAutomata, RegExp,
};

const DICTIONARY: &[&str] = &[
    "apple", "applet", "apply", "banana", "band", "bandana", "can", "candy", "cane", "canny",
];

fn matches(run: &ByteRunAutomaton) -> Vec<&'static str> {
    DICTIONARY
        .iter()
        .copied()
        .filter(|t| run.run(t.as_bytes()))
        .collect()
}

fn main() -> Result<(), AutomatonError> {
    let re = RegExp::new("ban(d|ana)@")?;
    let a = re.to_automaton()?;
    println!("regexp {} ({} states): {:?}", re, a.num_states(), matches(&ByteRunAutomaton::new(a.clone())));
    println!("  common prefix: {:?}", common_prefix(&a));

    let fuzzy = LevenshteinAutomata::new("cany", true).to_automaton(1)?;
    println!("fuzzy cany~1 ({} states): {:?}", fuzzy.num_states(), matches(&ByteRunAutomaton::new(fuzzy)));

    let set = DaciukMihovAutomatonBuilder::build(["applet", "band", "candy"])?;
    println!("term set ({} states): {:?}", set.num_states(), matches(&ByteRunAutomaton::new(set.clone())));
    if let Some(strings) = finite_strings(&set, Some(10)) {
        for s in strings {
            println!("  {}", s.iter().filter_map(|&c| char::from_u32(c)).collect::<String>());
        }
    }

    match RegExp::new("(unclosed") {
        Err(e) => println!("rejected: {}", e),
        Ok(re) => println!("unexpectedly parsed {}", re),
    }
    Ok(())
}
