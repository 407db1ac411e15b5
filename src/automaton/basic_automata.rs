//! Constructors for elementary automata.

use super::basic_operations;
use super::daciuk_mihov::DaciukMihovAutomatonBuilder;
use super::graph::{Automaton, Graph};
use super::state::{StateId, Transition, MAX_CODE_POINT, MIN_CODE_POINT};
use crate::error::{AutomatonError, Result};

/// Accepts nothing.
pub fn make_empty() -> Automaton {
    Automaton::new()
}

/// Accepts only the empty string.
pub fn make_empty_string() -> Automaton {
    Automaton::from_singleton(String::new())
}

/// Accepts every string.
pub fn make_any_string() -> Automaton {
    let mut g = Graph::new();
    let s = g.initial;
    g.set_accept(s, true);
    g.states[s.index()].add_transition(Transition::new(MIN_CODE_POINT, MAX_CODE_POINT, s));
    Automaton::from_graph(g, true)
}

/// Accepts any single code point.
pub fn make_any_char() -> Automaton {
    make_char_range(MIN_CODE_POINT, MAX_CODE_POINT)
}

/// Accepts the single code point `c`.
///
/// Values that are not scalar values (surrogates) get an explicit graph
/// since they cannot live in a `String`.
pub fn make_char(c: u32) -> Automaton {
    match char::from_u32(c) {
        Some(ch) => Automaton::from_singleton(ch.to_string()),
        None => Automaton::from_graph(Graph::from_code_points([c]), true),
    }
}

/// Accepts any single code point in `[min, max]`; empty if `min > max`.
pub fn make_char_range(min: u32, max: u32) -> Automaton {
    if min == max {
        return make_char(min);
    }
    if min > max {
        return make_empty();
    }
    let mut g = Graph::new();
    let end = g.new_state();
    g.set_accept(end, true);
    let initial = g.initial;
    g.add_transition(initial, Transition::new(min, max, end));
    g.numbered = true;
    Automaton::from_graph(g, true)
}

pub fn make_string(s: &str) -> Automaton {
    Automaton::from_singleton(s)
}

/// Minimal automaton for a sorted set of terms.
pub fn make_string_union<I, S>(terms: I) -> Result<Automaton>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    DaciukMihovAutomatonBuilder::build(terms)
}

/// Accepts the decimal numbers in `[min, max]`.
///
/// With `digits > 0` only numbers written with exactly that many digits
/// (zero-padded) are accepted. With `digits == 0` any number of leading
/// zeros is allowed.
pub fn make_interval(min: u32, max: u32, digits: usize) -> Result<Automaton> {
    let x = min.to_string();
    let y = max.to_string();
    if min > max {
        return Err(AutomatonError::InvalidInterval(format!("{} > {}", min, max)));
    }
    if digits > 0 && y.len() > digits {
        return Err(AutomatonError::InvalidInterval(format!(
            "{} does not fit in {} digits",
            max, digits
        )));
    }
    let width = if digits > 0 { digits } else { y.len() };
    let x = format!("{:0>width$}", x, width = width);
    let y = format!("{:0>width$}", y, width = width);

    let mut g = Graph::bare();
    let mut initials = Vec::new();
    let zeros = digits == 0;
    let initial = between(&mut g, x.as_bytes(), y.as_bytes(), 0, &mut initials, zeros);
    g.initial = initial;

    if !zeros {
        return Ok(Automaton::from_graph(g, true));
    }
    let pairs: Vec<(StateId, StateId)> = initials
        .into_iter()
        .filter(|&p| p != initial)
        .map(|p| (initial, p))
        .collect();
    let mut a = Automaton::from_graph(g, false);
    basic_operations::add_epsilons(&mut a, &pairs);
    a.graph_mut()
        .add_transition(initial, Transition::single(u32::from(b'0'), initial));
    a.set_deterministic(false);
    Ok(a)
}

fn digit(b: u8) -> u32 {
    u32::from(b)
}

fn any_of_right_length(g: &mut Graph, x: &[u8], n: usize) -> StateId {
    let s = g.new_state();
    if x.len() == n {
        g.set_accept(s, true);
    } else {
        let next = any_of_right_length(g, x, n + 1);
        g.add_transition(s, Transition::new(digit(b'0'), digit(b'9'), next));
    }
    s
}

fn at_least(g: &mut Graph, x: &[u8], n: usize, initials: &mut Vec<StateId>, zeros: bool) -> StateId {
    let s = g.new_state();
    if x.len() == n {
        g.set_accept(s, true);
        return s;
    }
    if zeros {
        initials.push(s);
    }
    let c = x[n];
    let next = at_least(g, x, n + 1, initials, zeros && c == b'0');
    g.add_transition(s, Transition::single(digit(c), next));
    if c < b'9' {
        let any = any_of_right_length(g, x, n + 1);
        g.add_transition(s, Transition::new(digit(c + 1), digit(b'9'), any));
    }
    s
}

fn at_most(g: &mut Graph, x: &[u8], n: usize) -> StateId {
    let s = g.new_state();
    if x.len() == n {
        g.set_accept(s, true);
        return s;
    }
    let c = x[n];
    let next = at_most(g, x, n + 1);
    g.add_transition(s, Transition::single(digit(c), next));
    if c > b'0' {
        let any = any_of_right_length(g, x, n + 1);
        g.add_transition(s, Transition::new(digit(b'0'), digit(c - 1), any));
    }
    s
}

fn between(
    g: &mut Graph,
    x: &[u8],
    y: &[u8],
    n: usize,
    initials: &mut Vec<StateId>,
    zeros: bool,
) -> StateId {
    let s = g.new_state();
    if x.len() == n {
        g.set_accept(s, true);
        return s;
    }
    if zeros {
        initials.push(s);
    }
    let (cx, cy) = (x[n], y[n]);
    if cx == cy {
        let next = between(g, x, y, n + 1, initials, zeros && cx == b'0');
        g.add_transition(s, Transition::single(digit(cx), next));
    } else {
        let low = at_least(g, x, n + 1, initials, zeros && cx == b'0');
        g.add_transition(s, Transition::single(digit(cx), low));
        let high = at_most(g, y, n + 1);
        g.add_transition(s, Transition::single(digit(cy), high));
        if cx + 1 < cy {
            let any = any_of_right_length(g, x, n + 1);
            g.add_transition(s, Transition::new(digit(cx + 1), digit(cy - 1), any));
        }
    }
    s
}
